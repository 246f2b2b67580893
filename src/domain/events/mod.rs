//! Store events surfaced to the view layer
use rust_decimal::Decimal;
use tokio::sync::broadcast;

use crate::domain::aggregates::{ApplicationStatus, OrderStatus, PaymentMethod};

#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    Cart(CartEvent),
    Order(OrderEvent),
    Distributor(DistributorEvent),
    /// Non-fatal warning, e.g. a pre-flight guard refusing an action.
    Warning(String),
    /// Failed request; local state was left as it was.
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    ItemsReplaced { user_id: String, item_count: usize },
    Cleared,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderEvent {
    Placed { order_id: String, method: PaymentMethod, total: Decimal },
    RedirectDispatched { order_id: String, url: String },
    StatusChanged { order_id: String, status: OrderStatus },
    MarkedPaid { order_id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DistributorEvent {
    Submitted { application_id: String },
    StatusChanged { application_id: String, status: ApplicationStatus },
}

/// Fan-out of [`StoreEvent`]s. Publishing with no subscribers is not an error.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> { self.tx.subscribe() }

    pub fn publish(&self, event: StoreEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("store event dropped, no subscribers");
        }
    }

    pub fn warn(&self, message: impl Into<String>) { self.publish(StoreEvent::Warning(message.into())); }
    pub fn error(&self, message: impl Into<String>) { self.publish(StoreEvent::Error(message.into())); }
}

impl Default for EventBus {
    fn default() -> Self { Self::new(64) }
}
