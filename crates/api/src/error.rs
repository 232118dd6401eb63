//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use checkout::CheckoutError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
///
/// Every failure renders as `{"kind": …, "error": …}`: a stable
/// machine-checkable kind next to the human-readable message the
/// storefront displays.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout pipeline error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };

        let body = serde_json::json!({ "kind": kind, "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, &'static str, String) {
    let status = match &err {
        CheckoutError::MissingSession
        | CheckoutError::EmptyCart
        | CheckoutError::MalformedProductId(_)
        | CheckoutError::NoValidItems
        | CheckoutError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
        CheckoutError::PaymentDeclined => StatusCode::PAYMENT_REQUIRED,
        // Consistency and backend failures: the service already logged
        // the reconciliation context; the client only learns it cannot
        // simply retry.
        CheckoutError::StockCommitFailed { .. }
        | CheckoutError::OrderPersistFailed { .. }
        | CheckoutError::Store(_)
        | CheckoutError::Cart(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, err.kind(), err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_errors_map_to_contract_status_codes() {
        let (status, kind, _) = checkout_error_to_response(CheckoutError::EmptyCart);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(kind, "empty_cart");

        let (status, kind, _) = checkout_error_to_response(CheckoutError::PaymentDeclined);
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(kind, "payment_declined");

        let (status, _, message) = checkout_error_to_response(CheckoutError::InsufficientStock {
            product_name: "Cat Litter".to_string(),
            available: 0,
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Insufficient stock for Cat Litter. Available: 0");
    }
}
