//! Checkout requests and the read projections returned to callers.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, OrderItemId, ProductId};
use serde::{Deserialize, Serialize};
use store::{Order, OrderItem, OrderStatus};

/// One requested line: a product and how many units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CheckoutItem {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A cart to be turned into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: CustomerId,
    pub items: Vec<CheckoutItem>,
}

impl CheckoutRequest {
    pub fn new(customer_id: CustomerId, items: Vec<CheckoutItem>) -> Self {
        Self { customer_id, items }
    }
}

/// Serializes money as a decimal string such as `"45.00"`.
pub mod decimal {
    use common::Money;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(amount: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_decimal_string())
    }
}

/// Order header projection returned by checkout and listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(serialize_with = "decimal::serialize")]
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            customer_id: order.customer_id,
            order_number: order.order_number.clone(),
            status: order.status,
            total_amount: order.total_amount,
            created_at: order.created_at,
        }
    }
}

/// Minimal status projection of a stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatusResponse {
    pub order_id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderStatusResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            order_number: order.order_number.clone(),
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// A priced line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemResponse {
    pub order_item_id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(serialize_with = "decimal::serialize")]
    pub unit_price: Money,
    #[serde(serialize_with = "decimal::serialize")]
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            order_item_id: item.order_item_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            created_at: item.created_at,
        }
    }
}

/// An order together with its priced lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub item_count: usize,
    pub items: Vec<OrderItemResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_response_serializes_decimal_amount() {
        let response = OrderResponse {
            order_id: OrderId::new(),
            customer_id: CustomerId::new(),
            order_number: "ORD-TEST".to_string(),
            status: OrderStatus::Confirmed,
            total_amount: Money::from_cents(4500),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["total_amount"], "45.00");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["order_number"], "ORD-TEST");
    }

    #[test]
    fn checkout_request_deserializes() {
        let customer_id = CustomerId::new();
        let product_id = ProductId::new();
        let json = serde_json::json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 2 }]
        });

        let request: CheckoutRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.customer_id, customer_id);
        assert_eq!(request.items, vec![CheckoutItem::new(product_id, 2)]);
    }
}
