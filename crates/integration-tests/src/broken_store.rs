//! A [`Store`] whose every operation fails, for the 500 paths.

use async_trait::async_trait;
use ecommerce_api::db::{RepositoryError, Store};
use ecommerce_api::models::{NewOrder, NewUser, Order, OrderChanges, User, UserChanges};
use ecommerce_core::{OrderId, UserId};

/// How a [`BrokenStore`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// `RepositoryError::Database(PoolTimedOut)`.
    Database,
    /// Panic inside the handler.
    Panic,
}

#[derive(Debug, Clone, Copy)]
pub struct BrokenStore {
    failure: Failure,
}

impl BrokenStore {
    #[must_use]
    pub const fn new(failure: Failure) -> Self {
        Self { failure }
    }

    fn fail<T>(self) -> Result<T, RepositoryError> {
        match self.failure {
            Failure::Database => Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)),
            Failure::Panic => panic!("store exploded"),
        }
    }
}

#[async_trait]
impl Store for BrokenStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.fail()
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.fail()
    }

    async fn get_user(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
        self.fail()
    }

    async fn find_user_id_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        self.fail()
    }

    async fn create_user(&self, _user: &NewUser) -> Result<User, RepositoryError> {
        self.fail()
    }

    async fn update_user(
        &self,
        _id: UserId,
        _changes: &UserChanges,
    ) -> Result<bool, RepositoryError> {
        self.fail()
    }

    async fn delete_user(&self, _id: UserId) -> Result<bool, RepositoryError> {
        self.fail()
    }

    async fn list_orders(&self, _user_id: Option<UserId>) -> Result<Vec<Order>, RepositoryError> {
        self.fail()
    }

    async fn get_order(&self, _id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.fail()
    }

    async fn create_order(&self, _order: &NewOrder) -> Result<Option<Order>, RepositoryError> {
        self.fail()
    }

    async fn update_order(
        &self,
        _id: OrderId,
        _changes: &OrderChanges,
    ) -> Result<Option<Order>, RepositoryError> {
        self.fail()
    }

    async fn delete_order(&self, _id: OrderId) -> Result<bool, RepositoryError> {
        self.fail()
    }
}
