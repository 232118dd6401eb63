//! Topic-per-order publish/subscribe relay for order status updates.
//!
//! Delivery is best-effort while subscribed: there is no history and no
//! replay, so a subscriber that arrives after a publish receives nothing
//! for that publish. Callers needing guaranteed delivery poll the durable
//! order status instead.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use common::OrderId;
use tokio::sync::broadcast;

/// Buffered updates per topic before slow subscribers start lagging.
const TOPIC_CAPACITY: usize = 16;

/// Registry of per-order broadcast topics.
///
/// Topics are created on subscribe, never on publish, and are removed
/// when the last subscriber leaves so the registry does not accumulate
/// dead senders.
#[derive(Debug, Clone, Default)]
pub struct StatusChannel {
    topics: Arc<RwLock<HashMap<OrderId, broadcast::Sender<String>>>>,
}

impl StatusChannel {
    /// Creates an empty channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to status updates for one order.
    ///
    /// The returned subscription unsubscribes on drop, on every exit path.
    pub fn subscribe(&self, order_id: OrderId) -> StatusSubscription {
        let mut topics = self.topics.write().unwrap();
        let sender = topics
            .entry(order_id)
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0);

        StatusSubscription {
            receiver: Some(sender.subscribe()),
            channel: self.clone(),
            order_id,
        }
    }

    /// Publishes a status string to whoever is subscribed right now.
    ///
    /// Fire-and-forget: returns the number of subscribers reached, which
    /// is zero when nobody is listening.
    pub fn publish(&self, order_id: OrderId, status: &str) -> usize {
        let topics = self.topics.read().unwrap();
        let reached = match topics.get(&order_id) {
            Some(sender) => sender.send(status.to_string()).unwrap_or(0),
            None => 0,
        };

        metrics::counter!("status_updates_published").increment(1);
        tracing::debug!(%order_id, status, reached, "status update published");
        reached
    }

    /// Returns the number of live subscribers for an order.
    pub fn subscriber_count(&self, order_id: OrderId) -> usize {
        self.topics
            .read()
            .unwrap()
            .get(&order_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Returns the number of orders with at least one topic registered.
    pub fn topic_count(&self) -> usize {
        self.topics.read().unwrap().len()
    }

    fn release(&self, order_id: OrderId) {
        let mut topics = self.topics.write().unwrap();
        if let Some(sender) = topics.get(&order_id)
            && sender.receiver_count() == 0
        {
            topics.remove(&order_id);
        }
    }
}

/// A live subscription to one order's status topic.
pub struct StatusSubscription {
    receiver: Option<broadcast::Receiver<String>>,
    channel: StatusChannel,
    order_id: OrderId,
}

impl StatusSubscription {
    /// The order this subscription is scoped to.
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Waits for the next published status update.
    ///
    /// Blocks on the broadcast receiver (no busy polling). Lagged gaps
    /// are skipped; `None` means the topic is gone and no further updates
    /// will arrive.
    pub async fn next(&mut self) -> Option<String> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(status) => return Some(status),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        order_id = %self.order_id,
                        skipped,
                        "status subscriber lagged; missed updates are dropped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        // Drop the receiver first so the count observed below is accurate.
        self.receiver.take();
        self.channel.release(self.order_id);
    }
}
