//! User domain types.

use ecommerce_core::{Email, UserId};
use serde::Serialize;

/// A row of `utenti`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nome")]
    #[sqlx(rename = "nome")]
    pub name: String,
    pub email: String,
}

/// A validated user creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
}

/// A validated partial update. At least one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
}

impl UserChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// Apply the set fields to `user` in place.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            user.email = email.as_str().to_owned();
        }
    }
}
