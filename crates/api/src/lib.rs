//! Ecommerce API library.
//!
//! REST facade over the `utenti` and `ordini` tables. Every response is a
//! status envelope rendered as JSON or XML depending on `?format=`.
//!
//! The crate is split so the router can be built and exercised in tests
//! without a database: see [`db::MemoryStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::app;
pub use state::AppState;
