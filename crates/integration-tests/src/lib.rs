//! Integration tests for the ecommerce API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no database needed)
//! cargo test -p ecommerce-integration-tests
//!
//! # PostgreSQL store tests (DATABASE_URL must point at a server
//! # where sqlx can create scratch databases)
//! cargo test -p ecommerce-integration-tests --test postgres_store -- --ignored
//!
//! # Smoke test against a running server
//! API_BASE_URL=http://127.0.0.1:8080 cargo test -p ecommerce-integration-tests \
//!     --test live_server -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `users`, `orders`, `formats` - Router driven with `oneshot` over a
//!   [`MemoryStore`]
//! - `postgres_store` - [`PgStore`](ecommerce_api::db::PgStore) against a real database
//! - `live_server` - HTTP round trips with reqwest

#![allow(clippy::missing_panics_doc)]

pub mod broken_store;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use ecommerce_api::AppState;
use ecommerce_api::db::{MemoryStore, Store};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub use broken_store::{BrokenStore, Failure};

/// A router over a store the test keeps a handle to; a fresh
/// [`MemoryStore`] unless built with [`TestApp::with_store`].
pub struct TestApp<S = MemoryStore> {
    pub router: Router,
    pub store: Arc<S>,
}

/// Status, headers and body text of one response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), false)
    }
}

impl<S: Store + 'static> TestApp<S> {
    #[must_use]
    pub fn with_store(store: S, expose_error_detail: bool) -> Self {
        let store = Arc::new(store);
        let state = AppState::new(store.clone(), expose_error_detail);
        Self {
            router: ecommerce_api::app(state),
            store,
        }
    }

    /// Send a request with an optional raw body.
    pub async fn send_raw(&self, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let req = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
            .expect("invalid request");

        let resp = self.router.clone().oneshot(req).await.expect("infallible");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Send a request with an optional JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let body = body.map(|b| b.to_string());
        self.send_raw(method, uri, body.as_deref()).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Create a user and return its id.
    pub async fn create_user(&self, name: &str, email: &str) -> i64 {
        let resp = self
            .post("/api/utenti", serde_json::json!({"nome": name, "email": email}))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
        resp.json()["id"].as_i64().expect("id missing")
    }

    /// Create an order and return its id.
    pub async fn create_order(&self, email: &str, product: &str, quantity: i64) -> i64 {
        let resp = self
            .post(
                "/api/ordini",
                serde_json::json!({"utente": email, "prodotto": product, "quantita": quantity}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
        resp.json()["id"].as_i64().expect("id missing")
    }
}
