//! Route handlers.

pub mod cart;
pub mod checkout;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod realtime;

use axum::http::HeaderMap;
use common::SessionId;

/// Header carrying the client's cart session.
pub const SESSION_HEADER: &str = "x-session-id";

/// Extracts the session id from request headers, rejecting blank values.
pub(crate) fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(SessionId::new)
}
