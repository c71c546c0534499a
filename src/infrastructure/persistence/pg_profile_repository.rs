//! PostgreSQL implementation of the profile repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewProfile, ProfileRecord, UserId};
use crate::domain::repositories::{ProfileRepository, RepositoryError};

/// PostgreSQL repository for the `users` profile collection.
///
/// One row per user id. `login_at` always comes from the database clock.
pub struct PgProfileRepository {
    pool: Arc<PgPool>,
}

impl PgProfileRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    name: Option<String>,
    email: Option<String>,
    login_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let uid = UserId::new(&row.id)
            .map_err(|e| RepositoryError::Internal(format!("invalid stored id '{}': {}", row.id, e)))?;

        Ok(Self {
            uid,
            name: row.name,
            email: row.email,
            login_at: row.login_at,
        })
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(e.to_string())
            }
            sqlx::Error::Database(db) if db.code().as_deref() == Some("42501") => {
                Self::PermissionDenied(db.message().to_string())
            }
            _ => Self::Internal(e.to_string()),
        }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn overwrite(
        &self,
        uid: &UserId,
        profile: &NewProfile,
    ) -> Result<ProfileRecord, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO users (id, name, email, login_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                login_at = EXCLUDED.login_at
            RETURNING id, name, email, login_at
            "#,
        )
        .bind(uid.as_str())
        .bind(profile.name.as_deref())
        .bind(profile.email.as_deref())
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find(&self, uid: &UserId) -> Result<Option<ProfileRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, email, login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(uid.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ProfileRecord::try_from).transpose()
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<ProfileRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, email, login_at
            FROM users
            ORDER BY login_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(ProfileRecord::try_from).collect()
    }

    async fn delete(&self, uid: &UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(uid.as_str())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
