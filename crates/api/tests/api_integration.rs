//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::InMemoryNotifier;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (Router, InMemoryNotifier) {
    let (state, notifier) = api::create_default_state();
    let app = api::create_app(state, get_metrics_handle());
    (app, notifier)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_customer(app: &Router, email: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/customers",
        Some(json!({
            "email": email,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "phone": "+254700000001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["customer_id"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, sku: &str, price: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/products",
        Some(json!({
            "product_name": format!("Product {sku}"),
            "price": price,
            "sku": sku,
            "stock_quantity": 10
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["price"], price);
    json["product_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_checkout_example_order() {
    let (app, notifier) = setup();
    let c1 = create_customer(&app, "c1@example.com").await;
    let p1 = create_product(&app, "P1", "10.00").await;
    let p2 = create_product(&app, "P2", "25.00").await;

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "customer_id": c1,
            "items": [
                { "product_id": p1, "quantity": 2 },
                { "product_id": p2, "quantity": 1 }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["customer_id"], c1.as_str());
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["total_amount"], "45.00");
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));
    assert!(order["created_at"].is_string());
    assert_eq!(notifier.emails_sent().len(), 1);
    assert_eq!(notifier.sms_sent().len(), 1);

    let order_id = order["order_id"].as_str().unwrap();
    let (status, details) = send(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["order_number"], order["order_number"]);
    assert_eq!(details["item_count"], 2);
    assert_eq!(details["items"][0]["unit_price"], "10.00");
    assert_eq!(details["items"][0]["total_price"], "20.00");
    assert_eq!(details["items"][1]["unit_price"], "25.00");
    assert_eq!(details["items"][1]["total_price"], "25.00");
}

#[tokio::test]
async fn test_order_status() {
    let (app, _) = setup();
    let customer = create_customer(&app, "status@example.com").await;
    let product = create_product(&app, "S1", "3.50").await;

    let (_, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "customer_id": customer,
            "items": [{ "product_id": product, "quantity": 1 }]
        })),
    )
    .await;
    let order_id = order["order_id"].as_str().unwrap();

    let (status, json) = send(&app, "GET", &format!("/orders/{order_id}/status"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order_id"], order_id);
    assert_eq!(json["order_number"], order["order_number"]);
    assert_eq!(json["status"], "confirmed");
    assert_eq!(json["created_at"], order["created_at"]);
    assert!(json.get("total_amount").is_none());
}

#[tokio::test]
async fn test_unknown_order_is_404() {
    let (app, _) = setup();

    let uri = "/orders/00000000-0000-4000-8000-000000000000/status";
    let (status, json) = send(&app, "GET", uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("Order not found"));
}

#[tokio::test]
async fn test_malformed_order_id_is_400() {
    let (app, _) = setup();

    let (status, json) = send(&app, "GET", "/orders/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_unknown_product_creates_no_order() {
    let (app, notifier) = setup();
    let c1 = create_customer(&app, "c1@example.com").await;
    let p1 = create_product(&app, "P1", "10.00").await;

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "customer_id": c1,
            "items": [
                { "product_id": p1, "quantity": 1 },
                { "product_id": "00000000-0000-4000-8000-000000000009", "quantity": 1 }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("Product not found"));

    let (status, orders) = send(&app, "GET", &format!("/customers/{c1}/orders"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 0);
    assert!(notifier.emails_sent().is_empty());
}

#[tokio::test]
async fn test_unknown_customer_is_404() {
    let (app, _) = setup();
    let product = create_product(&app, "P1", "1.00").await;

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "customer_id": "00000000-0000-4000-8000-000000000001",
            "items": [{ "product_id": product, "quantity": 1 }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_carts_are_400() {
    let (app, _) = setup();
    let customer = create_customer(&app, "invalid@example.com").await;
    let product = create_product(&app, "P1", "1.00").await;

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({ "customer_id": customer, "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Order must contain at least one item");

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "customer_id": customer,
            "items": [{ "product_id": product, "quantity": 0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "customer_id": "not-a-uuid",
            "items": [{ "product_id": product, "quantity": 1 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_customer_orders_newest_first() {
    let (app, _) = setup();
    let customer = create_customer(&app, "history@example.com").await;
    let product = create_product(&app, "H1", "2.00").await;

    for quantity in [1, 2] {
        let (status, _) = send(
            &app,
            "POST",
            "/orders",
            Some(json!({
                "customer_id": customer,
                "items": [{ "product_id": product, "quantity": quantity }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, orders) = send(&app, "GET", &format!("/customers/{customer}/orders"), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o["customer_id"] == customer.as_str()));
    assert_eq!(orders[0]["total_amount"], "4.00");
    assert_eq!(orders[1]["total_amount"], "2.00");
}

#[tokio::test]
async fn test_duplicate_customer_email_is_409() {
    let (app, _) = setup();
    create_customer(&app, "dup@example.com").await;

    let (status, json) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({
            "email": "dup@example.com",
            "first_name": "Other",
            "last_name": "Person",
            "phone": null
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_invalid_product_price_is_400() {
    let (app, _) = setup();

    let (status, _) = send(
        &app,
        "POST",
        "/products",
        Some(json!({
            "product_name": "Broken",
            "price": "12.345",
            "sku": "BROKEN"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();
    let customer = create_customer(&app, "metrics@example.com").await;
    let product = create_product(&app, "M1", "1.00").await;
    send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "customer_id": customer,
            "items": [{ "product_id": product, "quantity": 1 }]
        })),
    )
    .await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("checkout_orders_total"));
    assert!(text.contains("notifications_sent_total"));
}
