//! HTTP API server with observability for the storefront checkout.
//!
//! Provides REST endpoints for checkout, order lookups and catalog/customer
//! seeding, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{
    CheckoutService, DispatchMode, InMemoryNotifier, NotificationDispatcher, OrderNotifier,
    OrderStatusReader,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use store::{
    DynCatalog, DynCustomerDirectory, DynOrderStore, InMemoryCatalog, InMemoryCustomerDirectory,
    InMemoryOrderStore, PostgresStore, StoreError,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub checkout: CheckoutService,
    pub reader: OrderStatusReader,
    pub customers: DynCustomerDirectory,
    pub catalog: DynCatalog,
}

/// The three backing stores, behind their interfaces.
#[derive(Clone)]
pub struct Stores {
    pub customers: DynCustomerDirectory,
    pub catalog: DynCatalog,
    pub orders: DynOrderStore,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            customers: Arc::new(InMemoryCustomerDirectory::new()),
            catalog: Arc::new(InMemoryCatalog::new()),
            orders: Arc::new(InMemoryOrderStore::new()),
        }
    }

    /// Connects to PostgreSQL and applies pending migrations.
    pub async fn postgres(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = PostgresStore::new(pool);
        store.run_migrations().await?;
        tracing::info!(max_connections, "connected to PostgreSQL");

        let store = Arc::new(store);
        Ok(Self {
            customers: store.clone(),
            catalog: store.clone(),
            orders: store,
        })
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/{id}/status", get(routes::orders::status))
        .route("/customers", post(routes::customers::create))
        .route("/customers/{id}/orders", get(routes::customers::orders))
        .route("/products", post(routes::products::create))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the checkout service and order reader over `stores`.
pub fn create_state(
    stores: Stores,
    notifier: Arc<dyn OrderNotifier>,
    mode: DispatchMode,
) -> Arc<AppState> {
    let checkout = CheckoutService::new(
        stores.customers.clone(),
        stores.catalog.clone(),
        stores.orders.clone(),
        NotificationDispatcher::new(notifier, mode),
    );

    Arc::new(AppState {
        checkout,
        reader: OrderStatusReader::new(stores.orders),
        customers: stores.customers,
        catalog: stores.catalog,
    })
}

/// Creates state over in-memory stores with an in-memory notifier.
///
/// Notifications run inline so callers can observe them immediately.
pub fn create_default_state() -> (Arc<AppState>, InMemoryNotifier) {
    let notifier = InMemoryNotifier::new();
    let state = create_state(
        Stores::in_memory(),
        Arc::new(notifier.clone()),
        DispatchMode::Inline,
    );
    (state, notifier)
}
