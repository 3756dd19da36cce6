//! Ecommerce Core - Shared domain types.
//!
//! Types used by the HTTP API, the CLI and the integration tests:
//! - `api` - REST facade over the `utenti` and `ordini` tables
//! - `cli` - Migrations and seeding
//!
//! The core crate has no I/O: no database access, no HTTP. Database
//! encoding is opt-in through the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, email addresses and order quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
