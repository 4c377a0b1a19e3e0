//! Product change notifications.
//!
//! Request handlers publish change events after a successful mutation;
//! each websocket connection consumes them through its own receiver.
//! Publishing never blocks and never fails the originating request, and a
//! slow subscriber overflows only its own buffer.

pub mod websocket;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::Product;

/// Per-channel event buffer. A subscriber that falls further behind than
/// this skips ahead instead of stalling the publisher.
const EVENT_BUFFER: usize = 64;

/// What happened to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductAction {
    Created,
    Updated,
    Deleted,
}

/// A single product change, delivered to each subscriber as one JSON
/// text frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEvent {
    pub action: ProductAction,
    pub product_id: i32,
    /// The post-change entity; absent for deletions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    pub occurred_at: DateTime<Utc>,
}

impl ProductEvent {
    pub fn created(product: Product) -> Self {
        Self {
            action: ProductAction::Created,
            product_id: product.product_id,
            product: Some(product),
            occurred_at: Utc::now(),
        }
    }

    pub fn updated(product: &Product) -> Self {
        Self {
            action: ProductAction::Updated,
            product_id: product.product_id,
            product: Some(product.clone()),
            occurred_at: Utc::now(),
        }
    }

    pub fn deleted(product_id: i32) -> Self {
        Self {
            action: ProductAction::Deleted,
            product_id,
            product: None,
            occurred_at: Utc::now(),
        }
    }
}

/// Fan-out handle shared by request handlers (producers) and websocket
/// subscriber tasks (consumers).
#[derive(Clone, Debug)]
pub struct ProductEvents {
    sender: broadcast::Sender<ProductEvent>,
}

impl ProductEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self { sender }
    }

    /// Publish a change. Fire-and-forget: an event with no subscribers is
    /// dropped, and the send never blocks the request task.
    pub fn publish(&self, event: ProductEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProductEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProductEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let events = ProductEvents::new();
        let mut first = events.subscribe();
        let mut second = events.subscribe();

        events.publish(ProductEvent::deleted(7));

        assert_eq!(first.recv().await.unwrap().product_id, 7);
        assert_eq!(second.recv().await.unwrap().product_id, 7);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let events = ProductEvents::new();
        assert_eq!(events.subscriber_count(), 0);
        events.publish(ProductEvent::deleted(1));
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_ahead_instead_of_blocking_the_publisher() {
        let events = ProductEvents::new();
        let mut receiver = events.subscribe();

        for id in 0..(EVENT_BUFFER as i32 + 8) {
            events.publish(ProductEvent::deleted(id));
        }

        let err = receiver.recv().await.unwrap_err();
        assert!(matches!(err, RecvError::Lagged(_)));

        // After the lag report, delivery resumes from the oldest retained
        // event rather than the beginning.
        let next = receiver.recv().await.unwrap();
        assert!(next.product_id >= 8);
    }

    #[test]
    fn event_frames_use_wire_casing() {
        let json =
            serde_json::to_value(ProductEvent::deleted(3)).unwrap();
        assert_eq!(json["action"], "deleted");
        assert_eq!(json["productId"], 3);
        assert!(json.get("product").is_none());
        assert!(json.get("occurredAt").is_some());
    }
}
