//! Domain types for users and orders.
//!
//! Records carry the wire field names (`nome`, `utente_id`, `prodotto`,
//! `quantita`) through serde renames; Rust code uses English names.
//! Field declaration order is the order clients see in JSON and XML.

pub mod order;
pub mod user;

pub use order::{NewOrder, Order, OrderChanges};
pub use user::{NewUser, User, UserChanges};
