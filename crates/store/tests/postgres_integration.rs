//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{CustomerId, Money, OrderId, OrderItemId, ProductId};
use sqlx::PgPool;
use store::{
    Catalog, CustomerDirectory, NewCustomer, NewOrder, NewOrderItem, NewProduct, OrderStatus,
    OrderStore, PlaceOrderError, PostgresStore, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, products, customers")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

async fn create_customer(store: &PostgresStore, email: &str) -> CustomerId {
    store
        .create_customer(NewCustomer {
            email: email.to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            phone: Some("+254700000002".to_string()),
        })
        .await
        .unwrap()
        .customer_id
}

fn new_order(customer_id: CustomerId, number: &str, total_cents: i64) -> NewOrder {
    NewOrder {
        order_id: OrderId::new(),
        customer_id,
        order_number: number.to_string(),
        status: OrderStatus::Confirmed,
        total_amount: Money::from_cents(total_cents),
    }
}

fn new_item(order_id: OrderId, quantity: u32, unit_cents: i64) -> NewOrderItem {
    NewOrderItem {
        order_item_id: OrderItemId::new(),
        order_id,
        product_id: ProductId::new(),
        quantity,
        unit_price: Money::from_cents(unit_cents),
        total_price: Money::from_cents(unit_cents * i64::from(quantity)),
    }
}

#[tokio::test]
async fn customer_round_trip() {
    let store = get_test_store().await;
    let customer_id = create_customer(&store, "grace@example.com").await;

    let customer = store.get_customer(customer_id).await.unwrap();
    assert_eq!(customer.email, "grace@example.com");
    assert_eq!(customer.phone.as_deref(), Some("+254700000002"));
    assert!(!customer.is_deleted);
}

#[tokio::test]
async fn duplicate_customer_email_conflicts() {
    let store = get_test_store().await;
    create_customer(&store, "dup@example.com").await;

    let result = store
        .create_customer(NewCustomer {
            email: "dup@example.com".to_string(),
            first_name: "X".to_string(),
            last_name: "Y".to_string(),
            phone: None,
        })
        .await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn missing_customer_is_not_found() {
    let store = get_test_store().await;
    let err = store.get_customer(CustomerId::new()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn product_price_update() {
    let store = get_test_store().await;
    let product = store
        .create_product(NewProduct {
            product_name: "Widget".to_string(),
            description: Some("A widget".to_string()),
            price: Money::from_cents(1000),
            sku: "SKU-001".to_string(),
            stock_quantity: 5,
            is_active: true,
        })
        .await
        .unwrap();

    assert_eq!(product.price.cents(), 1000);

    let updated = store
        .update_price(product.product_id, Money::from_cents(1200))
        .await
        .unwrap();
    assert_eq!(updated.price.cents(), 1200);
    assert!(updated.updated_at.is_some());

    let fetched = store.get_product(product.product_id).await.unwrap();
    assert_eq!(fetched.price.cents(), 1200);
}

#[tokio::test]
async fn place_order_commits_header_and_items() {
    let store = get_test_store().await;
    let customer_id = create_customer(&store, "orders@example.com").await;

    let order = new_order(customer_id, "ORD-PG-1", 4500);
    let order_id = order.order_id;
    let items = vec![new_item(order_id, 2, 1000), new_item(order_id, 1, 2500)];

    let placed = store.place_order(order, items).await.unwrap();
    assert_eq!(placed.order.status, OrderStatus::Confirmed);
    assert_eq!(placed.order.total_amount.cents(), 4500);
    assert_eq!(placed.items.len(), 2);

    let fetched = store.get_order(order_id).await.unwrap();
    assert_eq!(fetched.order_number, "ORD-PG-1");

    let stored_items = store.list_order_items(order_id).await.unwrap();
    assert_eq!(stored_items.len(), 2);
    assert_eq!(stored_items[0].unit_price.cents(), 1000);
    assert_eq!(stored_items[0].total_price.cents(), 2000);
    assert_eq!(stored_items[1].unit_price.cents(), 2500);
}

#[tokio::test]
async fn place_order_rolls_back_when_an_item_fails() {
    let store = get_test_store().await;
    let customer_id = create_customer(&store, "rollback@example.com").await;

    let order = new_order(customer_id, "ORD-PG-2", 2000);
    let order_id = order.order_id;
    let first = new_item(order_id, 1, 1000);
    // Same primary key twice forces the second insert to fail.
    let mut second = new_item(order_id, 1, 1000);
    second.order_item_id = first.order_item_id;

    let err = store
        .place_order(order, vec![first, second])
        .await
        .unwrap_err();
    assert!(matches!(err, PlaceOrderError::Item { index: 1, .. }));

    let lookup = store.get_order(order_id).await.unwrap_err();
    assert!(lookup.is_not_found());
    assert!(store.list_order_items(order_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_order_number_is_a_conflict() {
    let store = get_test_store().await;
    let customer_id = create_customer(&store, "numbers@example.com").await;

    store
        .create_order(new_order(customer_id, "ORD-PG-3", 100))
        .await
        .unwrap();

    let result = store
        .place_order(new_order(customer_id, "ORD-PG-3", 100), vec![])
        .await;
    assert!(matches!(
        result,
        Err(PlaceOrderError::Header(StoreError::Conflict(_)))
    ));
}

#[tokio::test]
async fn list_orders_by_customer_newest_first() {
    let store = get_test_store().await;
    let customer_id = create_customer(&store, "history@example.com").await;
    let other = create_customer(&store, "other@example.com").await;

    store
        .create_order(new_order(customer_id, "ORD-PG-4", 100))
        .await
        .unwrap();
    store
        .create_order(new_order(customer_id, "ORD-PG-5", 200))
        .await
        .unwrap();
    store
        .create_order(new_order(other, "ORD-PG-6", 300))
        .await
        .unwrap();

    let orders = store.list_orders_by_customer(customer_id).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].order_number, "ORD-PG-5");
    assert_eq!(orders[1].order_number, "ORD-PG-4");
}

#[tokio::test]
async fn soft_deleted_order_is_not_found() {
    let store = get_test_store().await;
    let customer_id = create_customer(&store, "deleted@example.com").await;

    let order = store
        .create_order(new_order(customer_id, "ORD-PG-7", 100))
        .await
        .unwrap();
    store.get_order(order.order_id).await.unwrap();

    sqlx::query("UPDATE orders SET is_deleted = TRUE WHERE order_id = $1")
        .bind(order.order_id.as_uuid())
        .execute(store.pool())
        .await
        .unwrap();

    let err = store.get_order(order.order_id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(
        store
            .list_orders_by_customer(customer_id)
            .await
            .unwrap()
            .is_empty()
    );
}
