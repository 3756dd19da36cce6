//! `/api/ordini` handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::response::Response;
use ecommerce_core::{OrderId, UserId};

use super::{ApiQuery, ResourceQuery, body_bytes};
use crate::error::ApiError;
use crate::models::OrderChanges;
use crate::response::{Envelope, Reply, Resource, respond};
use crate::state::AppState;
use crate::validation::{
    CreateOrderRequest, UpdateOrderRequest, optional_id, parse_body, require_id,
};

const RESOURCE: Resource = Resource::Orders;
const NOT_FOUND: &str = "Ordine non trovato";
const USER_NOT_FOUND: &str = "Utente non trovato";
const MISSING_ID: &str = "ID ordine mancante";

/// GET /api/ordini[?utente_id=N | ?id=N]
pub async fn list(State(state): State<AppState>, query: ApiQuery) -> Response {
    let result = read(&state, query.params).await;
    respond(query.format, RESOURCE, state.expose_error_detail(), result)
}

/// POST /api/ordini
pub async fn create(
    State(state): State<AppState>,
    query: ApiQuery,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = insert(&state, query.params, body).await;
    respond(query.format, RESOURCE, state.expose_error_detail(), result)
}

/// PUT /api/ordini?id=N
pub async fn update(
    State(state): State<AppState>,
    query: ApiQuery,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = modify(&state, query.params, body).await;
    respond(query.format, RESOURCE, state.expose_error_detail(), result)
}

/// DELETE /api/ordini?id=N
pub async fn delete(State(state): State<AppState>, query: ApiQuery) -> Response {
    let result = remove(&state, query.params).await;
    respond(query.format, RESOURCE, state.expose_error_detail(), result)
}

pub async fn method_not_allowed(State(state): State<AppState>, query: ApiQuery) -> Response {
    super::method_not_allowed(&state, query.format, RESOURCE)
}

async fn read(state: &AppState, params: Result<ResourceQuery, ApiError>) -> Result<Reply, ApiError> {
    let params = params?;

    if let Some(id) = optional_id::<OrderId>(params.id.as_deref())? {
        let order = state
            .store()
            .get_order(id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        return Ok(Reply::ok(Envelope::success().with_record(&order)?));
    }

    let owner = optional_id::<UserId>(params.utente_id.as_deref())?;
    let orders = state.store().list_orders(owner).await?;
    Ok(Reply::ok(Envelope::success().with_records(&orders)?))
}

async fn insert(
    state: &AppState,
    params: Result<ResourceQuery, ApiError>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Reply, ApiError> {
    params?;
    let order = parse_body::<CreateOrderRequest>(&body_bytes(body)?)?.validate()?;

    let created = state
        .store()
        .create_order(&order)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    tracing::info!(order_id = %created.id, user_id = %created.user_id, "Order created");

    Ok(Reply::created(
        Envelope::success()
            .with_message("Ordine creato")
            .with_record(&created)?
            .with_id(created.id.as_i32()),
    ))
}

async fn modify(
    state: &AppState,
    params: Result<ResourceQuery, ApiError>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Reply, ApiError> {
    let id = require_id::<OrderId>(params?.id.as_deref(), MISSING_ID)?;
    let update = parse_body::<UpdateOrderRequest>(&body_bytes(body)?)?.validate()?;

    let user_id = match update.customer_email.as_deref() {
        Some(email) => Some(
            state
                .store()
                .find_user_id_by_email(email)
                .await?
                .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?,
        ),
        None => None,
    };
    let changes = OrderChanges {
        user_id,
        product: update.product,
        quantity: update.quantity,
    };

    let updated = state
        .store()
        .update_order(id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    tracing::info!(order_id = %id, "Order updated");

    Ok(Reply::ok(
        Envelope::success()
            .with_message("Ordine aggiornato")
            .with_record(&updated)?,
    ))
}

async fn remove(state: &AppState, params: Result<ResourceQuery, ApiError>) -> Result<Reply, ApiError> {
    let id = require_id::<OrderId>(params?.id.as_deref(), MISSING_ID)?;

    if !state.store().delete_order(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    tracing::info!(order_id = %id, "Order deleted");

    Ok(Reply::ok(Envelope::success().with_message("Ordine eliminato")))
}
