//! Subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;

/// Database URL from `ECOMMERCE_DATABASE_URL`, falling back to `DATABASE_URL`
/// like the API server does.
///
/// Returns the name of the preferred variable when neither is set.
pub fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    std::env::var("ECOMMERCE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "ECOMMERCE_DATABASE_URL")
}
