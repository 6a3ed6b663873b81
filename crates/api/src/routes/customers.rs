//! Customer registration and order history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CustomerId;
use domain::OrderResponse;
use store::{Customer, NewCustomer};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

/// POST /customers
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let Json(customer) = payload?;
    if customer.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }

    let customer = state.customers.create_customer(customer).await?;
    tracing::info!(customer_id = %customer.customer_id, "customer registered");

    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /customers/{id}/orders: newest first.
#[tracing::instrument(skip(state))]
pub async fn orders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let customer_id: CustomerId = parse_id(&id)?;
    let orders = state.reader.list_customer_orders(customer_id).await?;

    Ok(Json(orders))
}
