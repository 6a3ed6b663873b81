//! Checkout: turns a validated cart into a persisted, confirmed order.

use std::sync::Arc;

use common::{Money, OrderId, OrderItemId};
use store::{
    DynCatalog, DynCustomerDirectory, DynOrderStore, NewOrder, NewOrderItem, OrderStatus,
    PlaceOrderError, StoreError,
};

use crate::error::CheckoutError;
use crate::notification::NotificationDispatcher;
use crate::order_number::{OrderNumberGenerator, RandomOrderNumberGenerator};
use crate::schema::{CheckoutItem, CheckoutRequest, OrderResponse};

/// Orchestrates order creation across the customer directory, catalog and
/// order store, then hands the result to the notification dispatcher.
///
/// Collaborators are shared handles, so the service is cheap to clone and
/// safe to call from many request tasks at once.
#[derive(Clone)]
pub struct CheckoutService {
    customers: DynCustomerDirectory,
    catalog: DynCatalog,
    orders: DynOrderStore,
    order_numbers: Arc<dyn OrderNumberGenerator>,
    notifications: NotificationDispatcher,
}

impl CheckoutService {
    pub fn new(
        customers: DynCustomerDirectory,
        catalog: DynCatalog,
        orders: DynOrderStore,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            customers,
            catalog,
            orders,
            order_numbers: Arc::new(RandomOrderNumberGenerator),
            notifications,
        }
    }

    /// Replaces the order number generator.
    pub fn with_order_number_generator(
        mut self,
        generator: Arc<dyn OrderNumberGenerator>,
    ) -> Self {
        self.order_numbers = generator;
        self
    }

    /// Creates a confirmed order for the request.
    ///
    /// Every line is priced from the catalog at the moment of checkout. No
    /// order data is written unless the customer and every product resolve,
    /// and the header and items are committed together. Notifications are
    /// attempted after the commit and cannot fail the call.
    #[tracing::instrument(
        skip(self, request),
        fields(customer_id = %request.customer_id, item_count = request.items.len())
    )]
    pub async fn create_order(
        &self,
        request: CheckoutRequest,
    ) -> Result<OrderResponse, CheckoutError> {
        let started = std::time::Instant::now();
        let result = self.checkout(request).await;
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(order) => {
                metrics::counter!("checkout_orders_total").increment(1);
                tracing::info!(
                    order_id = %order.order_id,
                    order_number = %order.order_number,
                    total = %order.total_amount,
                    "order confirmed"
                );
            }
            Err(error) => {
                metrics::counter!("checkout_failures_total", "reason" => error.reason())
                    .increment(1);
                tracing::warn!(reason = error.reason(), %error, "checkout failed");
            }
        }

        result
    }

    async fn checkout(&self, request: CheckoutRequest) -> Result<OrderResponse, CheckoutError> {
        validate_items(&request.items)?;

        self.customers
            .get_customer(request.customer_id)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => CheckoutError::CustomerNotFound(request.customer_id),
                e => CheckoutError::store("customer lookup")(e),
            })?;

        let order_id = OrderId::new();
        let mut lines = Vec::with_capacity(request.items.len());
        let mut total = Money::zero();

        for item in &request.items {
            let product = self
                .catalog
                .get_product(item.product_id)
                .await
                .map_err(|e| match e {
                    e if e.is_not_found() => CheckoutError::ProductNotFound(item.product_id),
                    e => CheckoutError::store("product lookup")(e),
                })?;

            if !product.is_active {
                return Err(CheckoutError::ProductNotFound(item.product_id));
            }

            let overflow = || CheckoutError::AmountOverflow {
                product_id: item.product_id,
            };
            let line_total = product
                .price
                .checked_multiply(item.quantity)
                .ok_or_else(overflow)?;
            total = total.checked_add(line_total).ok_or_else(overflow)?;

            lines.push(NewOrderItem {
                order_item_id: OrderItemId::new(),
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: product.price,
                total_price: line_total,
            });
        }

        let header = NewOrder {
            order_id,
            customer_id: request.customer_id,
            order_number: self.order_numbers.generate(),
            status: OrderStatus::Confirmed,
            total_amount: total,
        };

        let placed = self
            .orders
            .place_order(header, lines)
            .await
            .map_err(persistence_error)?;

        let response = OrderResponse::from(&placed.order);
        self.notifications.dispatch(response.clone()).await;

        Ok(response)
    }
}

/// Rejects carts that could never produce a valid order.
fn validate_items(items: &[CheckoutItem]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }

    if let Some(item) = items.iter().find(|item| item.quantity == 0) {
        return Err(CheckoutError::InvalidQuantity {
            product_id: item.product_id,
            quantity: item.quantity,
        });
    }

    Ok(())
}

fn persistence_error(error: PlaceOrderError) -> CheckoutError {
    match error {
        PlaceOrderError::Header(source) | PlaceOrderError::Commit(source) => {
            CheckoutError::OrderPersistenceFailure(source)
        }
        PlaceOrderError::Item { index, source } => {
            CheckoutError::OrderItemPersistenceFailure { index, source }
        }
    }
}

/// Maps a lookup failure on an order to the checkout taxonomy.
pub(crate) fn order_lookup_error(order_id: OrderId) -> impl FnOnce(StoreError) -> CheckoutError {
    move |e| {
        if e.is_not_found() {
            CheckoutError::OrderNotFound(order_id)
        } else {
            CheckoutError::store("order lookup")(e)
        }
    }
}
