//! `/api/utenti` handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::response::Response;
use ecommerce_core::UserId;

use super::{ApiQuery, ResourceQuery, body_bytes};
use crate::error::ApiError;
use crate::response::{Envelope, Reply, Resource, respond};
use crate::state::AppState;
use crate::validation::{
    CreateUserRequest, UpdateUserRequest, optional_id, parse_body, require_id,
};

const RESOURCE: Resource = Resource::Users;
const NOT_FOUND: &str = "Utente non trovato";
const MISSING_ID: &str = "ID utente mancante";

/// GET /api/utenti[?id=N]
pub async fn list(State(state): State<AppState>, query: ApiQuery) -> Response {
    let result = read(&state, query.params).await;
    respond(query.format, RESOURCE, state.expose_error_detail(), result)
}

/// POST /api/utenti
pub async fn create(
    State(state): State<AppState>,
    query: ApiQuery,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = insert(&state, query.params, body).await;
    respond(query.format, RESOURCE, state.expose_error_detail(), result)
}

/// PUT /api/utenti?id=N
pub async fn update(
    State(state): State<AppState>,
    query: ApiQuery,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = modify(&state, query.params, body).await;
    respond(query.format, RESOURCE, state.expose_error_detail(), result)
}

/// DELETE /api/utenti?id=N
pub async fn delete(State(state): State<AppState>, query: ApiQuery) -> Response {
    let result = remove(&state, query.params).await;
    respond(query.format, RESOURCE, state.expose_error_detail(), result)
}

pub async fn method_not_allowed(State(state): State<AppState>, query: ApiQuery) -> Response {
    super::method_not_allowed(&state, query.format, RESOURCE)
}

async fn read(state: &AppState, params: Result<ResourceQuery, ApiError>) -> Result<Reply, ApiError> {
    let params = params?;

    if let Some(id) = optional_id::<UserId>(params.id.as_deref())? {
        let user = state
            .store()
            .get_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        return Ok(Reply::ok(Envelope::success().with_record(&user)?));
    }

    let users = state.store().list_users().await?;
    Ok(Reply::ok(Envelope::success().with_records(&users)?))
}

async fn insert(
    state: &AppState,
    params: Result<ResourceQuery, ApiError>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Reply, ApiError> {
    params?;
    let user = parse_body::<CreateUserRequest>(&body_bytes(body)?)?.validate()?;

    let created = state.store().create_user(&user).await?;
    tracing::info!(user_id = %created.id, "User created");

    Ok(Reply::created(
        Envelope::success()
            .with_message("Utente creato")
            .with_record(&created)?
            .with_id(created.id.as_i32()),
    ))
}

async fn modify(
    state: &AppState,
    params: Result<ResourceQuery, ApiError>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Reply, ApiError> {
    let id = require_id::<UserId>(params?.id.as_deref(), MISSING_ID)?;
    let changes = parse_body::<UpdateUserRequest>(&body_bytes(body)?)?.validate()?;

    if !state.store().update_user(id, &changes).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    tracing::info!(user_id = %id, "User updated");

    Ok(Reply::ok(Envelope::success().with_message("Utente aggiornato")))
}

async fn remove(state: &AppState, params: Result<ResourceQuery, ApiError>) -> Result<Reply, ApiError> {
    let id = require_id::<UserId>(params?.id.as_deref(), MISSING_ID)?;

    if !state.store().delete_user(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    tracing::info!(user_id = %id, "User deleted");

    Ok(Reply::ok(Envelope::success().with_message("Utente eliminato")))
}
