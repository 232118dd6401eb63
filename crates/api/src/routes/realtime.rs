//! Realtime order-status relay over WebSocket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use cart::CartStore;
use checkout::PaymentGateway;
use common::OrderId;
use futures_util::{SinkExt, StreamExt};
use realtime::StatusSubscription;
use store::{OrderStore, ProductStore};

use crate::AppState;
use crate::error::ApiError;

/// GET /ws/orders/:id — subscribe to an order's status updates.
///
/// The subscription is taken before the upgrade completes, so a publish
/// racing the handshake is still delivered. There is no replay: updates
/// published before this request receive nothing.
#[tracing::instrument(skip(state, ws))]
pub async fn order_status<C, O, K, G>(
    State(state): State<Arc<AppState<C, O, K, G>>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError>
where
    C: ProductStore + 'static,
    O: OrderStore + 'static,
    K: CartStore + 'static,
    G: PaymentGateway + 'static,
{
    let order_id =
        OrderId::parse(&id).map_err(|_| ApiError::BadRequest(format!("Invalid order id: {id}")))?;

    let subscription = state.status.subscribe(order_id);

    Ok(ws.on_upgrade(move |socket| relay_status(socket, subscription)))
}

/// Forwards published status strings to the client as
/// `{"status": <string>}` frames until either side goes away.
///
/// The subscription drops on every exit path, which is what guarantees
/// unsubscription.
async fn relay_status(socket: WebSocket, mut subscription: StatusSubscription) {
    let order_id = subscription.order_id();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            update = subscription.next() => {
                let Some(status) = update else {
                    break;
                };
                let frame = serde_json::json!({ "status": status }).to_string();
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    // No input frames are expected after subscribe;
                    // anything readable is ignored.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(%order_id, "status relay closed");
}
