//! In-memory store with the same constraints as the SQL schema.
//!
//! Used for local runs without a database (`ECOMMERCE_STORE=memory`) and by
//! the router tests. State is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ecommerce_core::{OrderId, UserId};
use tokio::sync::RwLock;

use super::{RepositoryError, Store};
use crate::models::{NewOrder, NewUser, Order, OrderChanges, User, UserChanges};

#[derive(Debug, Clone)]
struct OrderRow {
    user_id: UserId,
    product: String,
    quantity: i32,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    orders: BTreeMap<OrderId, OrderRow>,
    last_user_id: i32,
    last_order_id: i32,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn user_id_by_email(&self, email: &str) -> Option<UserId> {
        self.users.values().find(|u| u.email == email).map(|u| u.id)
    }

    /// Join an order row with its owner, like the SQL `JOIN utenti`.
    fn joined(&self, id: OrderId, row: &OrderRow) -> Option<Order> {
        let user = self.users.get(&row.user_id)?;
        Some(Order {
            id,
            user_id: user.id,
            email: user.email.clone(),
            user_name: user.name.clone(),
            product: row.product.clone(),
            quantity: row.quantity,
        })
    }
}

fn duplicate_email() -> RepositoryError {
    RepositoryError::Conflict("Email già registrata".to_owned())
}

/// [`Store`] holding both tables behind one `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        Ok(self.tables.read().await.user_id_by_email(email))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(user.email.as_str(), None) {
            return Err(duplicate_email());
        }

        tables.last_user_id += 1;
        let created = User {
            id: UserId::new(tables.last_user_id),
            name: user.name.clone(),
            email: user.email.as_str().to_owned(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email
            && tables.email_taken(email.as_str(), Some(id))
        {
            return Err(duplicate_email());
        }

        match tables.users.get_mut(&id) {
            Some(user) => {
                changes.apply_to(user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.orders.values().any(|o| o.user_id == id) {
            return Err(RepositoryError::Conflict(
                "L'utente ha ordini associati".to_owned(),
            ));
        }
        Ok(tables.users.remove(&id).is_some())
    }

    async fn list_orders(&self, user_id: Option<UserId>) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .filter(|(_, row)| user_id.is_none_or(|uid| row.user_id == uid))
            .filter_map(|(id, row)| tables.joined(*id, row))
            .collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .get(&id)
            .and_then(|row| tables.joined(id, row)))
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(user_id) = tables.user_id_by_email(&order.customer_email) else {
            return Ok(None);
        };

        tables.last_order_id += 1;
        let id = OrderId::new(tables.last_order_id);
        let row = OrderRow {
            user_id,
            product: order.product.clone(),
            quantity: order.quantity.get(),
        };
        let created = tables.joined(id, &row);
        tables.orders.insert(id, row);
        Ok(created)
    }

    async fn update_order(
        &self,
        id: OrderId,
        changes: &OrderChanges,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(user_id) = changes.user_id
            && !tables.users.contains_key(&user_id)
        {
            return Err(RepositoryError::NotFound);
        }

        let Some(row) = tables.orders.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(user_id) = changes.user_id {
            row.user_id = user_id;
        }
        if let Some(product) = &changes.product {
            row.product.clone_from(product);
        }
        if let Some(quantity) = changes.quantity {
            row.quantity = quantity.get();
        }

        let row = row.clone();
        Ok(tables.joined(id, &row))
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.orders.remove(&id).is_some())
    }
}
