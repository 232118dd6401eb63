//! Storefront product endpoints: the catalog reads the pipeline consumes.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use cart::CartStore;
use checkout::PaymentGateway;
use common::Money;
use serde::{Deserialize, Serialize};
use store::{OrderStore, Product, ProductStore};

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            id: product.id.to_string(),
            name: product.name,
            price_cents: product.price.cents(),
            stock: product.stock,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
}

/// GET /products — list the tenant's catalog.
#[tracing::instrument(skip(state))]
pub async fn list<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    let products = state.catalog.list(state.tenant.id).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// POST /products — add a product to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    if req.stock < 0 {
        return Err(ApiError::BadRequest(
            "stock must be non-negative".to_string(),
        ));
    }

    let product = Product::new(
        state.tenant.id,
        req.name,
        Money::from_cents(req.price_cents),
        req.stock,
    );
    state.catalog.save(&product).await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}
