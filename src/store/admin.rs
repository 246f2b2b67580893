//! Admin order management
//!
//! Status updates are unguarded apart from requiring a selection; the backend
//! decides whether a transition is acceptable. Mark-as-paid is the one guarded
//! admin action.

use std::sync::Arc;

use crate::api::{AdminApi, ClientError};
use crate::domain::aggregates::{Order, OrderAction, OrderStatus, SalesSummary};
use crate::domain::events::{EventBus, OrderEvent, StoreEvent};
use crate::store::order::OrderBook;
use crate::{Result, StorefrontError};

const ALL_ORDERS: &str = "all";

pub struct AdminOrderStore {
    api: Arc<dyn AdminApi>,
    events: EventBus,
    book: OrderBook,
}

impl AdminOrderStore {
    pub fn new(api: Arc<dyn AdminApi>, events: EventBus) -> Self {
        Self { api, events, book: OrderBook::default() }
    }

    pub async fn orders(&self) -> Vec<Order> { self.book.orders().await }
    pub async fn current(&self) -> Option<Order> { self.book.current().await }

    pub async fn list_all(&self) -> Result<Vec<Order>> {
        let ticket = self.book.list_ticket(ALL_ORDERS);
        let orders = self.api.list_all_orders().await.map_err(|e| self.failed("list orders", e))?;
        Ok(self.book.apply_list(&ticket, orders).await)
    }

    pub async fn fetch_detail(&self, order_id: &str) -> Result<Order> {
        let ticket = self.book.detail_ticket(order_id);
        let order = self.api.get_order_details(order_id).await.map_err(|e| self.failed("fetch order", e))?;
        Ok(self.book.apply_detail(&ticket, order).await)
    }

    pub async fn close_detail(&self) { self.book.close_detail().await; }

    /// Sets any status the admin picked. `None` means nothing was selected.
    pub async fn update_status(&self, order_id: &str, selection: Option<OrderStatus>) -> Result<Order> {
        let status = selection.ok_or_else(|| {
            let message = "Please select an order status.".to_string();
            self.events.warn(message.clone());
            StorefrontError::Validation(message)
        })?;

        self.api.update_order_status(order_id, status).await.map_err(|e| self.failed("update order status", e))?;
        let refreshed = self.fetch_detail(order_id).await?;
        tracing::info!(order_id, requested = %status, status = %refreshed.order_status, "order status updated");
        self.events.publish(StoreEvent::Order(OrderEvent::StatusChanged { order_id: refreshed.id.clone(), status: refreshed.order_status }));
        Ok(refreshed)
    }

    /// Settles a delivered cash-on-delivery order whose payment is still pending.
    pub async fn mark_paid(&self, order_id: &str) -> Result<Order> {
        let order = match self.book.find(order_id).await {
            Some(order) => order,
            None => self.fetch_detail(order_id).await?,
        };
        if let Err(e) = order.ensure(OrderAction::MarkPaid) {
            let err = StorefrontError::from(e);
            tracing::warn!(order_id, method = %order.payment_method, payment = ?order.payment_status, "mark as paid refused");
            self.events.warn(err.user_message());
            return Err(err);
        }

        self.api.mark_order_paid(order_id).await.map_err(|e| self.failed("mark order paid", e))?;
        let refreshed = self.fetch_detail(order_id).await?;
        tracing::info!(order_id, "order marked as paid");
        self.events.publish(StoreEvent::Order(OrderEvent::MarkedPaid { order_id: refreshed.id.clone() }));
        Ok(refreshed)
    }

    /// Revenue and status breakdown over the last fetched order list.
    pub async fn sales_summary(&self) -> SalesSummary {
        SalesSummary::from_orders(&self.book.orders().await)
    }

    fn failed(&self, action: &str, err: ClientError) -> StorefrontError {
        let err = StorefrontError::from(err);
        tracing::error!(action, error = %err, "admin order request failed");
        self.events.error(err.user_message());
        err
    }
}
