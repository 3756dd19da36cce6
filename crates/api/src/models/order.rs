//! Order domain types.

use ecommerce_core::{OrderId, Quantity, UserId};
use serde::Serialize;

/// An order joined with its owner, as returned by every order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "utente_id")]
    #[sqlx(rename = "utente_id")]
    pub user_id: UserId,
    pub email: String,
    #[serde(rename = "nome")]
    #[sqlx(rename = "nome")]
    pub user_name: String,
    #[serde(rename = "prodotto")]
    #[sqlx(rename = "prodotto")]
    pub product: String,
    #[serde(rename = "quantita")]
    #[sqlx(rename = "quantita")]
    pub quantity: i32,
}

/// A validated order creation. The owner is given by email and resolved by
/// the store in the same statement as the insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_email: String,
    pub product: String,
    pub quantity: Quantity,
}

/// A validated partial update. `user_id` is already resolved from the
/// email the client sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub user_id: Option<UserId>,
    pub product: Option<String>,
    pub quantity: Option<Quantity>,
}
