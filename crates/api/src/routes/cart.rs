//! Cart endpoints, scoped by the client-supplied session header.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use cart::{CartContents, CartStore};
use checkout::{CheckoutError, PaymentGateway};
use serde::{Deserialize, Serialize};
use store::{OrderStore, ProductStore};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::session_from_headers;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct AddItemResponse {
    pub message: String,
    pub cart: CartContents,
}

/// POST /cart — increment a product's quantity in the session's cart.
///
/// The product id is accepted untouched; it is only validated against the
/// catalog at checkout.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add_item<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<AddItemResponse>, ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    let session = session_from_headers(&headers).ok_or(CheckoutError::MissingSession)?;

    let cart = state
        .carts
        .add_item(&state.tenant.slug, &session, &req.product_id, req.quantity)
        .await?;

    Ok(Json(AddItemResponse {
        message: "Added to cart".to_string(),
        cart,
    }))
}

/// GET /cart — the full cart mapping.
///
/// An absent session header yields an empty mapping, not an error; only
/// mutations require a session.
#[tracing::instrument(skip(state, headers))]
pub async fn get_cart<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
    headers: HeaderMap,
) -> Result<Json<CartContents>, ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    match session_from_headers(&headers) {
        Some(session) => Ok(Json(state.carts.get(&state.tenant.slug, &session).await?)),
        None => Ok(Json(CartContents::new())),
    }
}

/// DELETE /cart — drop the session's cart entirely. Idempotent.
#[tracing::instrument(skip(state, headers))]
pub async fn clear_cart<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    let session = session_from_headers(&headers).ok_or(CheckoutError::MissingSession)?;

    state.carts.clear(&state.tenant.slug, &session).await?;

    Ok(StatusCode::NO_CONTENT)
}
