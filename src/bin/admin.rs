//! CLI administration tool for urban-fix-login.
//!
//! Inspects and maintains the `users` profile records written on login,
//! without going through the web client.
//!
//! # Usage
//!
//! ```bash
//! # Show one profile
//! cargo run --bin admin -- profile show u1
//!
//! # List the most recent logins
//! cargo run --bin admin -- profile list --limit 20
//!
//! # Delete a profile
//! cargo run --bin admin -- profile delete u1
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use urban_fix_login::domain::entities::{ProfileRecord, UserId};
use urban_fix_login::domain::repositories::ProfileRepository;
use urban_fix_login::infrastructure::persistence::PgProfileRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing urban-fix-login.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect and manage user profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Profile management subcommands.
#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile recorded for a user id
    Show {
        /// User id assigned by the identity provider
        uid: String,
    },

    /// List profiles, most recent login first
    List {
        /// Maximum number of profiles to show
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },

    /// Delete a profile
    Delete {
        /// User id assigned by the identity provider
        uid: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Profile { action } => handle_profile_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches profile management commands.
async fn handle_profile_action(action: ProfileAction, pool: &PgPool) -> Result<()> {
    let repo = PgProfileRepository::new(Arc::new(pool.clone()));

    match action {
        ProfileAction::Show { uid } => show_profile(&repo, &parse_uid(&uid)?).await,
        ProfileAction::List { limit } => list_profiles(&repo, limit).await,
        ProfileAction::Delete { uid, yes } => delete_profile(&repo, &parse_uid(&uid)?, yes).await,
    }
}

fn parse_uid(raw: &str) -> Result<UserId> {
    UserId::new(raw).with_context(|| format!("Invalid user id '{}'", raw))
}

fn or_dash(value: Option<&str>) -> ColoredString {
    match value {
        Some(value) => value.normal(),
        None => "-".bright_black(),
    }
}

async fn show_profile(repo: &PgProfileRepository, uid: &UserId) -> Result<()> {
    let Some(profile) = repo.find(uid).await? else {
        println!("{}", format!("No profile for '{}'", uid).yellow());
        return Ok(());
    };

    print_details(&profile);
    Ok(())
}

fn print_details(profile: &ProfileRecord) {
    println!("{}", "Profile".bright_blue().bold());
    println!();
    println!("  Id:         {}", profile.uid.as_str().cyan());
    println!("  Name:       {}", or_dash(profile.name.as_deref()));
    println!("  Email:      {}", or_dash(profile.email.as_deref()));
    println!(
        "  Last login: {}",
        profile
            .login_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_white()
    );
    println!();
}

/// Lists profiles in a table, most recent login first.
async fn list_profiles(repo: &PgProfileRepository, limit: i64) -> Result<()> {
    println!("{}", "Profiles".bright_blue().bold());
    println!();

    let profiles = repo.list_recent(limit).await?;

    if profiles.is_empty() {
        println!("{}", "  No profiles found".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<28} {:<20} {:<28} {}",
        "ID".bright_white().bold(),
        "NAME".bright_white().bold(),
        "EMAIL".bright_white().bold(),
        "LAST LOGIN".bright_white().bold()
    );
    println!("  {}", "─".repeat(95).bright_black());

    for profile in &profiles {
        println!(
            "  {:<28} {:<20} {:<28} {}",
            profile.uid.as_str().cyan(),
            or_dash(profile.name.as_deref()),
            or_dash(profile.email.as_deref()),
            profile
                .login_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!(
        "  Total: {}",
        profiles.len().to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Deletes a profile after confirmation (unless `--yes`).
async fn delete_profile(repo: &PgProfileRepository, uid: &UserId, yes: bool) -> Result<()> {
    let Some(profile) = repo.find(uid).await? else {
        println!("{}", format!("No profile for '{}'", uid).yellow());
        return Ok(());
    };

    print_details(&profile);

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete this profile?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    if repo.delete(uid).await? {
        println!("{}", "Profile deleted".green().bold());
    } else {
        println!("{}", "Profile was already gone".yellow());
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let profiles_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!(
                "  Profiles:   {}",
                profiles_count.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}
