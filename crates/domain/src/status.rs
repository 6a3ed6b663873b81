//! Read-only projections of stored orders.

use common::{CustomerId, OrderId};
use store::DynOrderStore;

use crate::checkout::order_lookup_error;
use crate::error::CheckoutError;
use crate::schema::{OrderDetails, OrderItemResponse, OrderResponse, OrderStatusResponse};

/// Answers "where is my order" queries. Never writes.
#[derive(Clone)]
pub struct OrderStatusReader {
    orders: DynOrderStore,
}

impl OrderStatusReader {
    pub fn new(orders: DynOrderStore) -> Self {
        Self { orders }
    }

    /// Returns the status projection, or `OrderNotFound` for a missing or
    /// soft-deleted order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_status(
        &self,
        order_id: OrderId,
    ) -> Result<OrderStatusResponse, CheckoutError> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(order_lookup_error(order_id))?;

        Ok(OrderStatusResponse::from(&order))
    }

    /// Returns the order together with its non-deleted items.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_details(&self, order_id: OrderId) -> Result<OrderDetails, CheckoutError> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(order_lookup_error(order_id))?;

        let items: Vec<OrderItemResponse> = self
            .orders
            .list_order_items(order_id)
            .await
            .map_err(CheckoutError::store("order item listing"))?
            .iter()
            .filter(|item| !item.is_deleted)
            .map(OrderItemResponse::from)
            .collect();

        Ok(OrderDetails {
            order: OrderResponse::from(&order),
            item_count: items.len(),
            items,
        })
    }

    /// Returns the customer's orders, newest first. Unknown customers have none.
    #[tracing::instrument(skip(self))]
    pub async fn list_customer_orders(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderResponse>, CheckoutError> {
        let orders = self
            .orders
            .list_orders_by_customer(customer_id)
            .await
            .map_err(CheckoutError::store("order listing"))?;

        Ok(orders.iter().map(OrderResponse::from).collect())
    }
}
