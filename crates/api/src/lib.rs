//! HTTP API server for the commerce backend.
//!
//! Exposes the cart, checkout, order, and settlement operations over
//! REST, plus a WebSocket endpoint relaying realtime order-status
//! updates, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use cart::{CartStore, InMemoryCartStore};
use checkout::{CheckoutService, PaymentGateway, SimulatedGateway};
use common::Tenant;
use metrics_exporter_prometheus::PrometheusHandle;
use realtime::StatusChannel;
use settlement::{SettlementQueue, SettlementQueueHandle, SettlementWorker};
use store::{InMemoryCatalog, InMemoryOrders, OrderStore, ProductStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<C, O, K, G>
where
    C: ProductStore,
    O: OrderStore,
    K: CartStore,
    G: PaymentGateway,
{
    pub tenant: Tenant,
    pub catalog: Arc<C>,
    pub orders: Arc<O>,
    pub carts: Arc<K>,
    pub checkout: CheckoutService<C, O, K, G>,
    pub settlement: SettlementQueue,
    pub status: StatusChannel,
}

/// The state shape used by the default in-memory deployment.
pub type DefaultAppState =
    AppState<InMemoryCatalog, InMemoryOrders, InMemoryCartStore, SimulatedGateway>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, O, K, G>(
    state: Arc<AppState<C, O, K, G>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            get(routes::products::list::<C, O, K, G>).post(routes::products::create::<C, O, K, G>),
        )
        .route(
            "/cart",
            post(routes::cart::add_item::<C, O, K, G>)
                .get(routes::cart::get_cart::<C, O, K, G>)
                .delete(routes::cart::clear_cart::<C, O, K, G>),
        )
        .route("/checkout", post(routes::checkout::checkout::<C, O, K, G>))
        .route("/orders/{id}", get(routes::orders::get::<C, O, K, G>))
        .route(
            "/orders/{id}/settle",
            post(routes::orders::settle::<C, O, K, G>),
        )
        .route(
            "/ws/orders/{id}",
            get(routes::realtime::order_status::<C, O, K, G>),
        )
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

/// Creates the default application state over in-memory stores, spawning
/// the settlement worker.
///
/// Must run inside a Tokio runtime. The returned handle joins the worker
/// once every clone of the state's settlement queue has been dropped.
pub fn create_default_state(config: &Config) -> (Arc<DefaultAppState>, SettlementQueueHandle) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let orders = Arc::new(InMemoryOrders::new());
    let carts = Arc::new(InMemoryCartStore::with_ttl(Duration::from_secs(
        config.cart_ttl_secs,
    )));
    let gateway = SimulatedGateway::new(Duration::from_millis(config.payment_delay_ms));

    let checkout = CheckoutService::new(catalog.clone(), orders.clone(), carts.clone(), gateway);

    let status = StatusChannel::new();
    let worker = SettlementWorker::new(
        orders.clone(),
        status.clone(),
        Duration::from_millis(config.settlement_delay_ms),
    );
    let (settlement, settlement_handle) = SettlementQueue::spawn(worker);

    let state = Arc::new(AppState {
        tenant: Tenant::new(&config.tenant_slug),
        catalog,
        orders,
        carts,
        checkout,
        settlement,
        status,
    });

    (state, settlement_handle)
}
