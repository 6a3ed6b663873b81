//! Catalog seeding endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use domain::schema::decimal;
use serde::{Deserialize, Serialize};
use store::{NewProduct, Product};

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub product_name: String,
    pub description: Option<String>,
    /// Decimal string, e.g. `"10.00"`.
    pub price: String,
    pub sku: String,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub product_id: ProductId,
    pub product_name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "decimal::serialize")]
    pub price: Money,
    pub sku: String,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name,
            description: product.description,
            price: product.price,
            sku: product.sku,
            stock_quantity: product.stock_quantity,
            is_active: product.is_active,
            created_at: product.created_at,
        }
    }
}

/// POST /products
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let Json(req) = payload?;

    let price = Money::parse_decimal(&req.price)
        .map_err(|e| ApiError::BadRequest(format!("Invalid price: {e}")))?;
    if price.is_negative() {
        return Err(ApiError::BadRequest("price must not be negative".to_string()));
    }
    if req.sku.trim().is_empty() {
        return Err(ApiError::BadRequest("sku is required".to_string()));
    }

    let product = state
        .catalog
        .create_product(NewProduct {
            product_name: req.product_name,
            description: req.description,
            price,
            sku: req.sku,
            stock_quantity: req.stock_quantity,
            is_active: req.is_active,
        })
        .await?;
    tracing::info!(product_id = %product.product_id, sku = %product.sku, "product created");

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}
