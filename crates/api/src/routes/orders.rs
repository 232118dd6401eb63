//! Order point-read and settlement enqueue endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart::CartStore;
use checkout::PaymentGateway;
use chrono::{DateTime, Utc};
use common::OrderId;
use serde::Serialize;
use store::{Order, OrderStore, ProductStore};

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub shipping_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let items = order
            .items
            .iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.to_string(),
                product_name: item.product_name.clone(),
                unit_price_cents: item.unit_price.cents(),
                quantity: item.quantity,
            })
            .collect();

        OrderResponse {
            id: order.id.to_string(),
            status: order.status.to_string(),
            items,
            total_cents: order.total.cents(),
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            created_at: order.created_at,
        }
    }
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    OrderId::parse(raw).map_err(|_| ApiError::BadRequest(format!("Invalid order id: {raw}")))
}

/// GET /orders/:id — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    let order_id = parse_order_id(&id)?;

    let order = state
        .orders
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(order.into()))
}

/// POST /orders/:id/settle — enqueue out-of-band settlement.
///
/// Returns immediately with 202; the worker runs on its own schedule and
/// the outcome is observable via the order's durable status or the
/// realtime channel.
#[tracing::instrument(skip(state))]
pub async fn settle<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    let order_id = parse_order_id(&id)?;

    if !state.settlement.enqueue(order_id) {
        return Err(ApiError::Internal(
            "settlement worker unavailable".to_string(),
        ));
    }

    Ok(StatusCode::ACCEPTED)
}
