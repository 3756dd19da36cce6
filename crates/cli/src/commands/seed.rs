//! Seed the database with users and orders from a YAML file.
//!
//! ```yaml
//! utenti:
//!   - nome: Anna
//!     email: anna@example.com
//! ordini:
//!   - utente: anna@example.com
//!     prodotto: Penna
//!     quantita: 2
//! ```
//!
//! Entries go through the same validation as the HTTP API. Users whose
//! email already exists are skipped, so a file can be applied twice.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use ecommerce_api::db::{self, PgStore, RepositoryError, Store};
use ecommerce_api::validation::{CreateOrderRequest, CreateUserRequest};

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub utenti: Vec<CreateUserRequest>,
    #[serde(default)]
    pub ordini: Vec<CreateOrderRequest>,
}

/// Outcome of a seeding run.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub users_inserted: usize,
    pub users_skipped: usize,
    pub orders_inserted: usize,
    /// `(entry, reason)` for every rejected entry.
    pub errors: Vec<(String, String)>,
}

/// Seed from a YAML file into the configured database.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or parsed, or the database is unreachable. Invalid entries are reported
/// in the summary instead.
pub async fn from_file(file_path: &str) -> Result<SeedResult, Box<dyn std::error::Error>> {
    let database_url = super::database_url().map_err(|var| format!("{var} not set"))?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Parse before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(
        users = seed.utenti.len(),
        orders = seed.ordini.len(),
        "Parsed seed file"
    );

    let pool = db::create_pool(&database_url, 1).await?;
    info!("Connected to database");

    let result = seed_store(&PgStore::new(pool), seed).await?;

    info!("Seeding complete!");
    info!("  Users inserted: {}", result.users_inserted);
    info!("  Users skipped (already exist): {}", result.users_skipped);
    info!("  Orders inserted: {}", result.orders_inserted);

    if !result.errors.is_empty() {
        error!("  Errors: {}", result.errors.len());
        for (entry, err) in &result.errors {
            error!("    - {entry}: {err}");
        }
    }

    Ok(result)
}

/// Insert users first, then orders, into any [`Store`].
///
/// # Errors
///
/// Returns `RepositoryError::Database` on the first database failure.
pub async fn seed_store(store: &dyn Store, seed: SeedFile) -> Result<SeedResult, RepositoryError> {
    let mut result = SeedResult::default();

    for (index, entry) in seed.utenti.into_iter().enumerate() {
        let label = format!("utenti[{index}]");
        let user = match entry.validate() {
            Ok(user) => user,
            Err(e) => {
                result.errors.push((label, e.to_string()));
                continue;
            }
        };
        match store.create_user(&user).await {
            Ok(_) => result.users_inserted += 1,
            Err(RepositoryError::Conflict(_)) => result.users_skipped += 1,
            Err(e) => return Err(e),
        }
    }

    for (index, entry) in seed.ordini.into_iter().enumerate() {
        let label = format!("ordini[{index}]");
        let order = match entry.validate() {
            Ok(order) => order,
            Err(e) => {
                result.errors.push((label, e.to_string()));
                continue;
            }
        };
        match store.create_order(&order).await? {
            Some(_) => result.orders_inserted += 1,
            None => result
                .errors
                .push((label, format!("Utente non trovato: {}", order.customer_email))),
        }
    }

    Ok(result)
}
