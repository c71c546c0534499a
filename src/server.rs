//! HTTP server initialization and runtime setup.
//!
//! Handles the profile store selection, migrations and the Axum server lifecycle.

use crate::config::Config;
use crate::domain::repositories::ProfileRepository;
use crate::infrastructure::persistence::{InMemoryProfileRepository, PgProfileRepository};
use crate::routes::app_router;
use crate::state::{AppState, LoginSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations (or the in-memory profile store)
/// - Popup broker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let profiles: Arc<dyn ProfileRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = connect(&config, database_url).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to migrate")?;

            Arc::new(PgProfileRepository::new(Arc::new(pool)))
        }
        None => {
            tracing::warn!("No database configured. Profiles are kept in memory only.");
            Arc::new(InMemoryProfileRepository::new())
        }
    };

    let state = AppState::new(
        profiles,
        Duration::from_secs(config.popup_ttl_seconds),
        LoginSettings::from_config(&config),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}

async fn connect(config: &Config, database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}
