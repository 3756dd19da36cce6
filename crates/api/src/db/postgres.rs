//! `PostgreSQL` store.
//!
//! Queries are built at runtime (`query_as`) so the crate compiles without
//! a live database; the update paths go through [`UpdateBuilder`].

use async_trait::async_trait;
use ecommerce_core::{OrderId, UserId};
use sqlx::PgPool;

use super::update::{OrderColumn, UpdateBuilder, UserColumn};
use super::{RepositoryError, Store};
use crate::models::{NewOrder, NewUser, Order, OrderChanges, User, UserChanges};

/// [`Store`] backed by a `PgPool`. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations on `utenti.email` become `Conflict`.
fn map_unique_email(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("Email già registrata".to_owned());
    }
    RepositoryError::Database(e)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>("SELECT id, nome, email FROM utenti ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT id, nome, email FROM utenti WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, UserId>("SELECT id FROM utenti WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO utenti (nome, email)
            VALUES ($1, $2)
            RETURNING id, nome, email
            ",
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_email)
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<bool, RepositoryError> {
        let mut builder = UpdateBuilder::<UserColumn>::new();
        builder
            .set_opt(UserColumn::Name, changes.name.clone())
            .set_opt(UserColumn::Email, changes.email.clone());

        let Some(mut query) = builder.finish(id.as_i32()) else {
            return Ok(self.get_user(id).await?.is_some());
        };

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_unique_email)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM utenti WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "L'utente ha ordini associati".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_orders(&self, user_id: Option<UserId>) -> Result<Vec<Order>, RepositoryError> {
        let orders = match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, Order>(
                    r"
                    SELECT o.id, o.utente_id, u.email, u.nome, o.prodotto, o.quantita
                    FROM ordini o
                    JOIN utenti u ON o.utente_id = u.id
                    WHERE o.utente_id = $1
                    ORDER BY o.id
                    ",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(
                    r"
                    SELECT o.id, o.utente_id, u.email, u.nome, o.prodotto, o.quantita
                    FROM ordini o
                    JOIN utenti u ON o.utente_id = u.id
                    ORDER BY o.id
                    ",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT o.id, o.utente_id, u.email, u.nome, o.prodotto, o.quantita
            FROM ordini o
            JOIN utenti u ON o.utente_id = u.id
            WHERE o.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Option<Order>, RepositoryError> {
        // Lookup and insert in one statement: no row is written when the
        // email is unknown, and the owner cannot vanish in between.
        let created = sqlx::query_as::<_, Order>(
            r"
            WITH inserted AS (
                INSERT INTO ordini (utente_id, prodotto, quantita)
                SELECT id, $2, $3 FROM utenti WHERE email = $1
                RETURNING id, utente_id, prodotto, quantita
            )
            SELECT i.id, i.utente_id, u.email, u.nome, i.prodotto, i.quantita
            FROM inserted i
            JOIN utenti u ON i.utente_id = u.id
            ",
        )
        .bind(&order.customer_email)
        .bind(&order.product)
        .bind(order.quantity)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_order(
        &self,
        id: OrderId,
        changes: &OrderChanges,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut builder = UpdateBuilder::<OrderColumn>::new();
        builder
            .set_opt(OrderColumn::UserId, changes.user_id)
            .set_opt(OrderColumn::Product, changes.product.clone())
            .set_opt(OrderColumn::Quantity, changes.quantity);

        let Some(mut query) = builder.finish(id.as_i32()) else {
            return self.get_order(id).await;
        };

        let updated = query
            .push(" RETURNING id")
            .build_query_scalar::<OrderId>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::NotFound;
                }
                RepositoryError::Database(e)
            })?;

        match updated {
            Some(id) => self.get_order(id).await,
            None => Ok(None),
        }
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM ordini WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
