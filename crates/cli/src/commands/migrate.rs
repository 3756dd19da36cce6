//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ecommerce-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ECOMMERCE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time:
//! ```text
//! migrations/
//! ├── 20261017000001_create_utenti.sql
//! └── 20261017000002_create_ordini.sql
//! ```

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is unset, the connection
/// fails or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().map_err(MigrationError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
