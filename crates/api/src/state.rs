//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::Store;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; the store is injected at construction so the same
/// router runs against `PostgreSQL` or the in-memory store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    expose_error_detail: bool,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Backend for the users and orders tables
    /// * `expose_error_detail` - Put raw store errors in 500 responses
    #[must_use]
    pub fn new(store: Arc<dyn Store>, expose_error_detail: bool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                expose_error_detail,
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn expose_error_detail(&self) -> bool {
        self.inner.expose_error_detail
    }
}
