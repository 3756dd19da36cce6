//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! ecommerce-cli user create -n "Anna" -e anna@example.com
//! ```

use ecommerce_api::db::{self, PgStore, RepositoryError, Store};
use ecommerce_api::error::ApiError;
use ecommerce_api::validation::CreateUserRequest;
use ecommerce_core::UserId;
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Name or email rejected by the same rules as `POST /api/utenti`.
    #[error("Invalid user: {0}")]
    Invalid(#[from] ApiError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create a user, applying the API's validation rules.
///
/// # Errors
///
/// Returns `UserError` if the input is invalid, the email is already taken
/// or the database is unreachable.
pub async fn create(name: &str, email: &str) -> Result<UserId, UserError> {
    let user = CreateUserRequest {
        name: Some(name.to_owned()),
        email: Some(email.to_owned()),
    }
    .validate()?;

    let database_url = super::database_url().map_err(UserError::MissingEnvVar)?;
    let pool = db::create_pool(&database_url, 1).await?;
    let store = PgStore::new(pool);

    let created = store.create_user(&user).await?;
    tracing::info!(
        user_id = %created.id,
        email = %created.email,
        "User created successfully"
    );

    Ok(created.id)
}
