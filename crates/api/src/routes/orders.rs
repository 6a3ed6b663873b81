//! Checkout and order read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{CheckoutRequest, OrderDetails, OrderResponse, OrderStatusResponse};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

/// POST /orders: check out a cart.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(request) = payload?;
    let order = state.checkout.create_order(request).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id}: order with its items.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetails>, ApiError> {
    let order_id: OrderId = parse_id(&id)?;
    let details = state.reader.get_order_details(order_id).await?;

    Ok(Json(details))
}

/// GET /orders/{id}/status
#[tracing::instrument(skip(state))]
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id)?;
    let status = state.reader.get_order_status(order_id).await?;

    Ok(Json(status))
}
