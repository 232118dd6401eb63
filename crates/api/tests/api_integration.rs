//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use api::{Config, DefaultAppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{Money, ProductId, TenantId};
use futures_util::StreamExt;
use metrics_exporter_prometheus::PrometheusHandle;
use store::{Order, OrderItem, OrderStatus, OrderStore};
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

fn test_config() -> Config {
    Config {
        tenant_slug: "petshop".to_string(),
        payment_delay_ms: 0,
        settlement_delay_ms: 0,
        ..Config::default()
    }
}

fn setup_with_state() -> (axum::Router, Arc<DefaultAppState>) {
    let (state, _settlement_handle) = api::create_default_state(&test_config());
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

fn setup() -> axum::Router {
    setup_with_state().0
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-session-id", "sess-1")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Seeds a product through the API and returns its id.
async fn seed_product(app: &axum::Router, name: &str, price_cents: i64, stock: i64) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            serde_json::json!({
                "name": name,
                "price_cents": price_cents,
                "stock": stock,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_str().unwrap().to_string()
}

async fn add_to_cart(app: &axum::Router, product_id: &str, quantity: i64) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/cart",
            serde_json::json!({ "product_id": product_id, "quantity": quantity }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn post_checkout(app: &axum::Router, payment_method: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/checkout",
            serde_json::json!({
                "shipping_address": "1 Main St",
                "payment_method": payment_method,
            }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_cart_add_get_clear_flow() {
    let app = setup();
    let product_id = seed_product(&app, "Dog Food 5kg", 1000, 5).await;

    // Add twice; quantities accumulate.
    add_to_cart(&app, &product_id, 2).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/cart",
            serde_json::json!({ "product_id": product_id, "quantity": 1 }),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["message"], "Added to cart");
    assert_eq!(json["cart"][&product_id], 3);

    // Read it back.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header("x-session-id", "sess-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json[&product_id], 3);

    // Clear, then the cart reads empty.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/cart")
                .header("x-session-id", "sess-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header("x-session-id", "sess-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({}));
}

#[tokio::test]
async fn test_cart_add_without_session_is_rejected() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cart")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "product_id": "anything", "quantity": 1 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "missing_session");
    assert_eq!(json["error"], "Missing Session ID");
}

#[tokio::test]
async fn test_cart_get_without_session_reads_empty() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({}));
}

#[tokio::test]
async fn test_checkout_happy_path() {
    let (app, state) = setup_with_state();
    let product_id = seed_product(&app, "Dog Food 5kg", 1000, 5).await;
    add_to_cart(&app, &product_id, 2).await;

    let response = post_checkout(&app, "credit_card").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "PAID");
    assert_eq!(json["message"], "Order placed successfully");
    let order_id = json["order_id"].as_str().unwrap().to_string();

    // The order is durably readable with the computed total.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{order_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "PAID");
    assert_eq!(json["total_cents"], 2000);
    assert_eq!(json["items"][0]["quantity"], 2);
    assert_eq!(json["items"][0]["product_name"], "Dog Food 5kg");

    // Stock went from 5 to 3 and the cart is empty.
    let pid = ProductId::parse(&product_id).unwrap();
    assert_eq!(state.catalog.stock_of(pid).await, Some(3));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header("x-session-id", "sess-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({}));
}

#[tokio::test]
async fn test_checkout_insufficient_stock_names_product() {
    let (app, state) = setup_with_state();
    let product_a = seed_product(&app, "Dog Food 5kg", 1000, 5).await;
    let product_b = seed_product(&app, "Cat Litter", 2000, 0).await;
    add_to_cart(&app, &product_a, 2).await;
    add_to_cart(&app, &product_b, 1).await;

    let response = post_checkout(&app, "credit_card").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "insufficient_stock");
    assert_eq!(json["error"], "Insufficient stock for Cat Litter. Available: 0");

    // No order was created and stock is untouched.
    let pid_a = ProductId::parse(&product_a).unwrap();
    assert_eq!(state.catalog.stock_of(pid_a).await, Some(5));
    assert_eq!(state.orders.order_count().await, 0);

    // The cart survives for the client to adjust.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header("x-session-id", "sess-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_checkout_payment_declined() {
    let (app, state) = setup_with_state();
    let product_id = seed_product(&app, "Dog Food 5kg", 1000, 5).await;
    add_to_cart(&app, &product_id, 1).await;

    let response = post_checkout(&app, "fail_test").await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "payment_declined");
    assert_eq!(json["error"], "Payment Failed");

    let pid = ProductId::parse(&product_id).unwrap();
    assert_eq!(state.catalog.stock_of(pid).await, Some(5));
    assert_eq!(state.orders.order_count().await, 0);
}

#[tokio::test]
async fn test_checkout_without_session() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkout")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "shipping_address": "1 Main St",
                        "payment_method": "credit_card",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "missing_session");
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let app = setup();

    let response = post_checkout(&app, "credit_card").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "empty_cart");
    assert_eq!(json["error"], "Cart is empty");
}

#[tokio::test]
async fn test_checkout_malformed_product_id() {
    let app = setup();
    add_to_cart(&app, "not-a-uuid", 1).await;

    let response = post_checkout(&app, "credit_card").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "malformed_product_id");
    assert_eq!(json["error"], "Invalid Product IDs in cart");
}

#[tokio::test]
async fn test_order_not_found_and_bad_id() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/orders/garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_products_listing() {
    let app = setup();
    seed_product(&app, "Dog Food 5kg", 1000, 5).await;
    seed_product(&app, "Cat Litter", 2000, 3).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let products = json.as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["name"], "Cat Litter");
    assert_eq!(products[1]["stock"], 5);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

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
}

fn pending_order(tenant_id: TenantId) -> Order {
    Order::new(
        tenant_id,
        vec![OrderItem::new(
            ProductId::new(),
            "Dog Food 5kg",
            Money::from_cents(1000),
            1,
        )],
        Money::from_cents(1000),
        OrderStatus::Pending,
        "1 Main St",
        "bank_transfer",
    )
}

#[tokio::test]
async fn test_settle_endpoint_transitions_order_out_of_band() {
    let (app, state) = setup_with_state();

    let order = pending_order(state.tenant.id);
    state.orders.create(&order).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/orders/{}/settle", order.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Settlement runs on the worker's schedule; poll the durable status.
    let mut settled = false;
    for _ in 0..200 {
        let loaded = state.orders.find_by_id(order.id).await.unwrap().unwrap();
        if loaded.status == OrderStatus::Paid {
            settled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(settled, "settlement worker never marked the order PAID");
}

#[tokio::test]
async fn test_websocket_relays_settlement_status() {
    let (app, state) = setup_with_state();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let order = pending_order(state.tenant.id);
    state.orders.create(&order).await.unwrap();

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/orders/{}", order.id))
        .await
        .unwrap();

    // The handler subscribes before completing the upgrade, so the topic
    // exists as soon as the handshake does.
    assert_eq!(state.status.subscriber_count(order.id), 1);

    assert!(state.settlement.enqueue(order.id));

    let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for status frame")
        .unwrap()
        .unwrap();
    let text = frame.into_text().unwrap();
    let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(json["status"], "PAID");

    ws.close(None).await.ok();
}
