//! Order store and checkout state machine
//!
//! Checkout moves `Draft -> Submitting -> Placed`. Status actions on existing
//! orders never touch local state optimistically: the request goes out, then
//! the order is read back from the server.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use validator::Validate;

use crate::api::{ClientError, StorefrontApi};
use crate::domain::aggregates::{AddressInfo, NewOrder, Order, OrderAction, PaymentCapture, PaymentMethod};
use crate::domain::events::{EventBus, OrderEvent, StoreEvent};
use crate::store::cart::CartStore;
use crate::store::sequence::{RequestSequencer, Ticket};
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Cart gathered, nothing sent yet.
    #[default]
    Draft,
    Submitting,
    Placed { order_id: String, redirect_url: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Send the shopper to the payment processor.
    Redirect { order_id: String, url: String },
    /// Cash on delivery: nothing left to do client-side.
    Placed { order_id: String },
}

impl CheckoutOutcome {
    pub fn order_id(&self) -> &str {
        match self { Self::Redirect { order_id, .. } | Self::Placed { order_id } => order_id }
    }
}

/// Order list plus the order currently opened in detail, both fenced against stale responses.
#[derive(Default)]
pub(crate) struct OrderBook {
    orders: RwLock<Vec<Order>>,
    current: RwLock<Option<Order>>,
    sequencer: RequestSequencer,
}

impl OrderBook {
    pub fn list_ticket(&self, scope: &str) -> Ticket { self.sequencer.issue(format!("orders:{}", scope)) }
    pub fn detail_ticket(&self, order_id: &str) -> Ticket { self.sequencer.issue(format!("order:{}", order_id)) }

    pub async fn orders(&self) -> Vec<Order> { self.orders.read().await.clone() }
    pub async fn current(&self) -> Option<Order> { self.current.read().await.clone() }

    pub async fn find(&self, order_id: &str) -> Option<Order> {
        if let Some(order) = self.current.read().await.as_ref().filter(|o| o.id == order_id) {
            return Some(order.clone());
        }
        self.orders.read().await.iter().find(|o| o.id == order_id).cloned()
    }

    pub async fn apply_list(&self, ticket: &Ticket, fresh: Vec<Order>) -> Vec<Order> {
        let mut orders = self.orders.write().await;
        if self.sequencer.commit(ticket) {
            *orders = fresh;
        }
        orders.clone()
    }

    /// Adopts a freshly read order as the current detail and patches it into the list.
    ///
    /// A stale read returns the newest applied copy of the same order instead.
    pub async fn apply_detail(&self, ticket: &Ticket, fresh: Order) -> Order {
        let mut current = self.current.write().await;
        let mut orders = self.orders.write().await;
        if !self.sequencer.commit(ticket) {
            return current
                .as_ref()
                .filter(|o| o.id == fresh.id)
                .or_else(|| orders.iter().find(|o| o.id == fresh.id))
                .cloned()
                .unwrap_or(fresh);
        }
        if let Some(slot) = orders.iter_mut().find(|o| o.id == fresh.id) {
            *slot = fresh.clone();
        }
        *current = Some(fresh.clone());
        fresh
    }

    pub async fn close_detail(&self) { *self.current.write().await = None; }
}

pub struct OrderStore {
    api: Arc<dyn StorefrontApi>,
    events: EventBus,
    phase: RwLock<CheckoutPhase>,
    book: OrderBook,
}

impl OrderStore {
    pub fn new(api: Arc<dyn StorefrontApi>, events: EventBus) -> Self {
        Self { api, events, phase: RwLock::new(CheckoutPhase::Draft), book: OrderBook::default() }
    }

    pub async fn phase(&self) -> CheckoutPhase { self.phase.read().await.clone() }
    pub async fn orders(&self) -> Vec<Order> { self.book.orders().await }
    pub async fn current(&self) -> Option<Order> { self.book.current().await }

    /// Back to `Draft`, e.g. when the shopper starts a new checkout.
    pub async fn reset(&self) { *self.phase.write().await = CheckoutPhase::Draft; }

    /// Places an order from the cart's current contents.
    ///
    /// Fails without any request when the cart is empty, no address is selected,
    /// the address is incomplete, or another checkout is still in flight.
    pub async fn checkout(&self, cart: &CartStore, user_id: &str, address: Option<&AddressInfo>, payment_method: PaymentMethod) -> Result<CheckoutOutcome> {
        let items = cart.items().await;
        if items.is_empty() {
            return Err(self.invalid("Your cart is empty. Please add items before proceeding."));
        }
        let address = address.ok_or_else(|| self.invalid("Please select an address to proceed."))?;
        if let Err(e) = address.validate() {
            return Err(self.invalid(format!("Address is incomplete: {}", e)));
        }

        {
            let mut phase = self.phase.write().await;
            if *phase == CheckoutPhase::Submitting {
                drop(phase);
                return Err(self.invalid("Checkout is already in progress."));
            }
            *phase = CheckoutPhase::Submitting;
        }

        let order = NewOrder::from_cart(user_id, &items, address.clone(), payment_method, Utc::now());
        tracing::info!(user_id, method = %payment_method, total = %order.total_amount, lines = order.cart_items.len(), "submitting checkout");

        let receipt = match self.api.create_order(&order).await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.checkout_failed(e).await),
        };

        let outcome = if payment_method.redirects() {
            match receipt.approval_url {
                Some(url) => CheckoutOutcome::Redirect { order_id: receipt.order_id.clone(), url },
                None => {
                    let err = ClientError::InvalidResponse("Payment redirect URL missing".to_string());
                    return Err(self.checkout_failed(err).await);
                }
            }
        } else {
            CheckoutOutcome::Placed { order_id: receipt.order_id.clone() }
        };

        let redirect_url = match &outcome {
            CheckoutOutcome::Redirect { url, .. } => Some(url.clone()),
            CheckoutOutcome::Placed { .. } => None,
        };
        *self.phase.write().await = CheckoutPhase::Placed { order_id: receipt.order_id.clone(), redirect_url: redirect_url.clone() };

        // Cleared as soon as the redirect is handed out; there is no rollback if the redirect never happens.
        cart.clear().await;

        tracing::info!(order_id = %receipt.order_id, "order placed");
        self.events.publish(StoreEvent::Order(OrderEvent::Placed {
            order_id: receipt.order_id.clone(),
            method: payment_method,
            total: order.total_amount.amount(),
        }));
        if let Some(url) = redirect_url {
            self.events.publish(StoreEvent::Order(OrderEvent::RedirectDispatched { order_id: receipt.order_id, url }));
        }
        Ok(outcome)
    }

    /// Confirms a processor payment once the shopper is redirected back.
    pub async fn capture_payment(&self, order_id: &str, payment_id: &str, payer_id: &str) -> Result<Order> {
        let capture = PaymentCapture { order_id: order_id.to_string(), payment_id: payment_id.to_string(), payer_id: payer_id.to_string() };
        let ticket = self.book.detail_ticket(order_id);
        let order = self.api.capture_payment(&capture).await.map_err(|e| self.failed("capture payment", e))?;
        let order = self.book.apply_detail(&ticket, order).await;
        tracing::info!(order_id, status = %order.order_status, "payment captured");
        self.events.publish(StoreEvent::Order(OrderEvent::StatusChanged { order_id: order.id.clone(), status: order.order_status }));
        Ok(order)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Order>> {
        let ticket = self.book.list_ticket(user_id);
        let orders = self.api.list_orders(user_id).await.map_err(|e| self.failed("list orders", e))?;
        Ok(self.book.apply_list(&ticket, orders).await)
    }

    pub async fn fetch_detail(&self, order_id: &str) -> Result<Order> {
        let ticket = self.book.detail_ticket(order_id);
        let order = self.api.get_order(order_id).await.map_err(|e| self.failed("fetch order", e))?;
        Ok(self.book.apply_detail(&ticket, order).await)
    }

    pub async fn close_detail(&self) { self.book.close_detail().await; }

    /// Allowed unless the order is already cancelled, returned or delivered.
    pub async fn cancel(&self, order_id: &str) -> Result<Order> {
        self.status_action(order_id, OrderAction::Cancel).await
    }

    /// Allowed only once the order is delivered.
    pub async fn request_return(&self, order_id: &str) -> Result<Order> {
        self.status_action(order_id, OrderAction::Return).await
    }

    async fn status_action(&self, order_id: &str, action: OrderAction) -> Result<Order> {
        let order = match self.book.find(order_id).await {
            Some(order) => order,
            None => self.fetch_detail(order_id).await?,
        };
        if let Err(e) = order.ensure(action) {
            let err = StorefrontError::from(e);
            tracing::warn!(order_id, %action, error = %err, "order action refused");
            self.events.warn(err.user_message());
            return Err(err);
        }

        let sent = match action {
            OrderAction::Cancel => self.api.cancel_order(order_id).await,
            OrderAction::Return => self.api.return_order(order_id).await,
            OrderAction::MarkPaid => return Err(StorefrontError::Validation("mark as paid is an admin action".to_string())),
        };
        sent.map_err(|e| self.failed("order status action", e))?;

        let refreshed = self.fetch_detail(order_id).await?;
        tracing::info!(order_id, %action, status = %refreshed.order_status, "order action applied");
        self.events.publish(StoreEvent::Order(OrderEvent::StatusChanged { order_id: refreshed.id.clone(), status: refreshed.order_status }));
        Ok(refreshed)
    }

    async fn checkout_failed(&self, err: ClientError) -> StorefrontError {
        *self.phase.write().await = CheckoutPhase::Draft;
        self.failed("checkout", err)
    }

    fn failed(&self, action: &str, err: ClientError) -> StorefrontError {
        let err = StorefrontError::from(err);
        tracing::error!(action, error = %err, "order request failed");
        self.events.error(err.user_message());
        err
    }

    fn invalid(&self, message: impl Into<String>) -> StorefrontError {
        let message = message.into();
        tracing::warn!(%message, "checkout refused");
        self.events.warn(message.clone());
        StorefrontError::Validation(message)
    }
}
