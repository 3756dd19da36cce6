//! Core types for the ecommerce API.

pub mod email;
pub mod id;
pub mod quantity;

pub use email::{Email, EmailError};
pub use id::{OrderId, UserId};
pub use quantity::{Quantity, QuantityError};
