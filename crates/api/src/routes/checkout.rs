//! The checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use cart::CartStore;
use checkout::{CheckoutRequest, PaymentGateway};
use serde::{Deserialize, Serialize};
use store::{OrderStore, ProductStore};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::session_from_headers;

#[derive(Deserialize)]
pub struct CheckoutBody {
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub status: String,
    pub message: String,
}

/// POST /checkout — run the synchronous checkout pipeline for the
/// session's cart.
#[tracing::instrument(skip(state, headers, body))]
pub async fn checkout<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    let session = session_from_headers(&headers);

    let receipt = state
        .checkout
        .checkout(
            &state.tenant,
            session.as_ref(),
            CheckoutRequest {
                shipping_address: body.shipping_address,
                payment_method: body.payment_method,
            },
        )
        .await?;

    Ok(Json(CheckoutResponse {
        order_id: receipt.order_id.to_string(),
        status: receipt.status.to_string(),
        message: "Order placed successfully".to_string(),
    }))
}
