//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (pings the store)
//!
//! # Users
//! GET     /api/utenti[?id=N]        - List users, or one user
//! POST    /api/utenti               - Create user {nome, email}
//! PUT     /api/utenti?id=N          - Partial update {nome?, email?}
//! DELETE  /api/utenti?id=N          - Delete user (409 if it has orders)
//!
//! # Orders
//! GET     /api/ordini[?utente_id=N] - List orders, optionally of one user
//! GET     /api/ordini?id=N          - One order
//! POST    /api/ordini               - Create order {utente, prodotto, quantita}
//! PUT     /api/ordini?id=N          - Partial update {utente?, prodotto?, quantita?}
//! DELETE  /api/ordini?id=N          - Delete order
//! ```
//!
//! Every `/api` route takes `?format=json|xml` (default JSON) and answers
//! `OPTIONS` with an empty 200. Other methods get a 405 envelope.

pub mod health;
pub mod orders;
pub mod users;

use std::any::Any;
use std::convert::Infallible;

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use serde::Deserialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};

use crate::error::ApiError;
use crate::response::{Format, Resource, render, respond};
use crate::state::AppState;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Query parameters shared by both resources.
#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub id: Option<String>,
    pub utente_id: Option<String>,
    pub format: Option<String>,
}

/// Only the `format` parameter, to pick the error encoding when the full
/// query does not deserialize.
#[derive(Debug, Default, Deserialize)]
struct FormatParam {
    format: Option<String>,
}

/// Query string extractor that never rejects.
///
/// The response format must be known before any error can be rendered, so
/// a malformed query string is carried as an `ApiError` for the handler to
/// return in the envelope.
pub struct ApiQuery {
    pub format: Format,
    pub params: Result<ResourceQuery, ApiError>,
}

impl<S: Send + Sync> FromRequestParts<S> for ApiQuery {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match Query::<ResourceQuery>::try_from_uri(&parts.uri) {
            Ok(Query(params)) => Ok(Self {
                format: Format::from_param(params.format.as_deref()),
                params: Ok(params),
            }),
            Err(rejection) => Ok(Self {
                format: Query::<FormatParam>::try_from_uri(&parts.uri)
                    .map(|Query(p)| Format::from_param(p.format.as_deref()))
                    .unwrap_or_default(),
                params: Err(ApiError::validation(format!(
                    "Parametri non validi: {}",
                    rejection.body_text()
                ))),
            }),
        }
    }
}

/// Request body as raw bytes; decoding happens in [`crate::validation`].
pub(crate) fn body_bytes(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
    body.map_err(|rejection| ApiError::validation(rejection.body_text()))
}

/// Build the application router (without state).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route(
            "/api/utenti",
            get(users::list)
                .post(users::create)
                .put(users::update)
                .delete(users::delete)
                .options(preflight)
                .fallback(users::method_not_allowed),
        )
        .route(
            "/api/ordini",
            get(orders::list)
                .post(orders::create)
                .put(orders::update)
                .delete(orders::delete)
                .options(preflight)
                .fallback(orders::method_not_allowed),
        )
        .layer(catch_panic_layer())
        .layer(cors_layer())
}

/// Build the router with state attached, ready to serve.
pub fn app(state: AppState) -> Router {
    routes().with_state(state)
}

/// CORS: any origin, the five supported methods, JSON bodies.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// Panics become a 500 `Errore del server` envelope instead of a dropped
/// connection. The requested format is unknown at this point, so it is JSON.
fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(server_error_on_panic as fn(_) -> _)
}

fn server_error_on_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %detail, "Handler panicked");

    let err = ApiError::Internal(format!("handler panicked: {detail}"));
    render(Format::Json, Resource::Users, err.status(), &err.to_envelope(false))
}

/// `OPTIONS` without CORS preflight headers: empty 200.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub(crate) fn method_not_allowed(state: &AppState, format: Format, resource: Resource) -> Response {
    let mut response = respond(
        format,
        resource,
        state.expose_error_detail(),
        Err(ApiError::MethodNotAllowed),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}
