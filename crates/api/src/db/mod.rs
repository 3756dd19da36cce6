//! Data access for the ecommerce database.
//!
//! ## Tables
//!
//! - `utenti` - Users (`id`, `nome`, `email` unique)
//! - `ordini` - Orders (`id`, `utente_id` → `utenti.id` restrict, `prodotto`, `quantita`)
//!
//! Handlers only see the [`Store`] trait. [`PgStore`] is the production
//! backend; [`MemoryStore`] has the same semantics without a database and
//! is selected with `ECOMMERCE_STORE=memory`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p ecommerce-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;
pub mod update;

use std::time::Duration;

use async_trait::async_trait;
use ecommerce_core::{OrderId, UserId};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::{NewOrder, NewUser, Order, OrderChanges, User, UserChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use update::{OrderColumn, UpdateBuilder, UserColumn};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A referenced row does not exist (e.g. the owner of an order was
    /// deleted between lookup and write).
    #[error("not found")]
    NotFound,

    /// Constraint violation: duplicate email, or deleting a user that
    /// still owns orders.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence operations behind the users and orders endpoints.
///
/// `Ok(None)` / `Ok(false)` mean "no matching row"; the handlers turn that
/// into a 404.
#[async_trait]
pub trait Store: Send + Sync {
    /// Round trip to the backend, used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_user_id_by_email(&self, email: &str)
    -> Result<Option<UserId>, RepositoryError>;

    /// # Errors
    ///
    /// `Conflict` if the email is already registered.
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Returns `false` if no user has this id.
    async fn update_user(&self, id: UserId, changes: &UserChanges)
    -> Result<bool, RepositoryError>;

    /// Returns `false` if no user has this id.
    ///
    /// # Errors
    ///
    /// `Conflict` if the user still owns orders.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError>;

    /// All orders, or only those of `user_id`, ordered by id.
    async fn list_orders(&self, user_id: Option<UserId>) -> Result<Vec<Order>, RepositoryError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Resolves `order.customer_email` and inserts in one step.
    /// Returns `None` (and inserts nothing) if the email matches no user.
    async fn create_order(&self, order: &NewOrder) -> Result<Option<Order>, RepositoryError>;

    /// Returns the updated order, or `None` if no order has this id.
    ///
    /// # Errors
    ///
    /// `NotFound` if `changes.user_id` no longer exists.
    async fn update_order(
        &self,
        id: OrderId,
        changes: &OrderChanges,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Returns `false` if no order has this id.
    async fn delete_order(&self, id: OrderId) -> Result<bool, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
