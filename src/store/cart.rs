//! Cart store
//!
//! Mirrors the server cart. Every successful mutation adopts the server's full
//! item list; a failed one leaves the local items untouched.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::{ClientResult, StorefrontApi};
use crate::domain::aggregates::{Cart, CartError, CartItem, QuantityChange, StockCache};
use crate::domain::events::{CartEvent, EventBus, StoreEvent};
use crate::domain::value_objects::Quantity;
use crate::store::sequence::{RequestSequencer, Ticket};
use crate::{Result, StorefrontError};

const CART_KEY: &str = "cart";

pub struct CartStore {
    api: Arc<dyn StorefrontApi>,
    stock: StockCache,
    events: EventBus,
    cart: RwLock<Cart>,
    sequencer: RequestSequencer,
}

impl CartStore {
    pub fn new(api: Arc<dyn StorefrontApi>, stock: StockCache, events: EventBus) -> Self {
        Self { api, stock, events, cart: RwLock::new(Cart::new()), sequencer: RequestSequencer::new() }
    }

    pub async fn items(&self) -> Vec<CartItem> { self.cart.read().await.items().to_vec() }
    pub async fn snapshot(&self) -> Cart { self.cart.read().await.clone() }
    pub async fn is_empty(&self) -> bool { self.cart.read().await.is_empty() }

    pub async fn fetch(&self, user_id: &str) -> Result<Vec<CartItem>> {
        let ticket = self.sequencer.issue(CART_KEY);
        let result = self.api.fetch_cart(user_id).await;
        self.apply(user_id, &ticket, result, "fetch cart").await
    }

    /// Adds `quantity` of a product, refusing up front when the cached stock cannot cover it.
    pub async fn add_item(&self, user_id: &str, product_id: &str, quantity: u32) -> Result<Vec<CartItem>> {
        let quantity = Quantity::new(quantity).map_err(|e| StorefrontError::Validation(e.to_string()))?;
        let planned = self.cart.read().await.plan_add(product_id, quantity, self.stock.get(product_id));
        planned.map_err(|e| self.refuse(e))?;

        let ticket = self.sequencer.issue(CART_KEY);
        let result = self.api.add_to_cart(user_id, product_id, quantity).await;
        self.apply(user_id, &ticket, result, "add to cart").await
    }

    /// Moves a line one step up or down.
    ///
    /// An increase past the cached `totalStock` is never sent. Decreases are not
    /// stock-checked but stop at one.
    pub async fn update_quantity(&self, user_id: &str, product_id: &str, change: QuantityChange) -> Result<Vec<CartItem>> {
        let planned = self.cart.read().await.plan_change(product_id, change, self.stock.get(product_id));
        let quantity = planned.map_err(|e| self.refuse(e))?;

        let ticket = self.sequencer.issue(CART_KEY);
        let result = self.api.update_cart_quantity(user_id, product_id, quantity).await;
        self.apply(user_id, &ticket, result, "update cart quantity").await
    }

    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> Result<Vec<CartItem>> {
        let ticket = self.sequencer.issue(CART_KEY);
        let result = self.api.remove_from_cart(user_id, product_id).await;
        self.apply(user_id, &ticket, result, "remove from cart").await
    }

    /// Empties the local mirror only. Order creation already emptied the server cart.
    ///
    /// Responses to requests issued before the clear are discarded when they land.
    pub async fn clear(&self) {
        let mut cart = self.cart.write().await;
        let ticket = self.sequencer.issue(CART_KEY);
        self.sequencer.commit(&ticket);
        cart.clear();
        tracing::info!("cart cleared");
        self.events.publish(StoreEvent::Cart(CartEvent::Cleared));
    }

    fn refuse(&self, err: CartError) -> StorefrontError {
        let err = StorefrontError::from(err);
        tracing::warn!(error = %err, "cart change refused before sending");
        self.events.warn(err.user_message());
        err
    }

    async fn apply(&self, user_id: &str, ticket: &Ticket, result: ClientResult<Vec<CartItem>>, action: &str) -> Result<Vec<CartItem>> {
        let items = match result {
            Ok(items) => items,
            Err(e) => {
                let err = StorefrontError::from(e);
                tracing::error!(user_id, action, error = %err, "cart request failed");
                self.events.error(err.user_message());
                return Err(err);
            }
        };

        let mut cart = self.cart.write().await;
        if self.sequencer.commit(ticket) {
            cart.replace(items);
            tracing::info!(user_id, action, items = cart.item_count(), "cart updated");
            self.events.publish(StoreEvent::Cart(CartEvent::ItemsReplaced { user_id: user_id.to_string(), item_count: cart.item_count() }));
        }
        Ok(cart.items().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{product, FakeApi};
    use crate::domain::value_objects::Money;

    fn store(api: Arc<FakeApi>, stock: &StockCache) -> CartStore {
        CartStore::new(api, stock.clone(), EventBus::default())
    }

    fn stocked(api: &FakeApi) -> StockCache {
        let stock = StockCache::new();
        stock.replace_all(&api.state().products);
        stock
    }

    #[tokio::test]
    async fn test_add_adopts_server_list() {
        let api = FakeApi::with_products(vec![product("P1", 100, 80, 5), product("P2", 50, 0, 5)]);
        api.state().carts.insert("U1".into(), vec![]);
        let cart = store(api.clone(), &stocked(&api));

        cart.add_item("U1", "P1", 2).await.unwrap();
        let items = cart.add_item("U1", "P2", 1).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(cart.snapshot().await.subtotal(), Money::from(210));
    }

    #[tokio::test]
    async fn test_increase_past_stock_is_not_sent() {
        let api = FakeApi::with_products(vec![product("P1", 10, 0, 2)]);
        let cart = store(api.clone(), &stocked(&api));
        let mut events = cart.events.subscribe();

        cart.add_item("U1", "P1", 2).await.unwrap();
        let err = cart.update_quantity("U1", "P1", QuantityChange::Increase).await.unwrap_err();
        assert!(matches!(err, StorefrontError::StockExceeded { requested: 3, available: 2, .. }));
        assert_eq!(api.call_count("update_cart_quantity"), 0);
        assert_eq!(cart.items().await[0].quantity.value(), 2);

        let mut saw_warning = false;
        while let Ok(event) = events.try_recv() {
            saw_warning |= matches!(event, StoreEvent::Warning(_));
        }
        assert!(saw_warning);
    }

    #[tokio::test]
    async fn test_add_past_stock_is_not_sent() {
        let api = FakeApi::with_products(vec![product("P1", 10, 0, 1)]);
        let cart = store(api.clone(), &stocked(&api));
        cart.add_item("U1", "P1", 1).await.unwrap();
        assert!(cart.add_item("U1", "P1", 1).await.is_err());
        assert_eq!(api.call_count("add_to_cart"), 1);
        assert!(matches!(cart.add_item("U1", "P1", 0).await, Err(StorefrontError::Validation(_))));
    }

    #[tokio::test]
    async fn test_decrease_and_floor() {
        let api = FakeApi::with_products(vec![product("P1", 10, 0, 0)]);
        let cart = store(api.clone(), &StockCache::new());
        cart.add_item("U1", "P1", 2).await.unwrap();
        // Stock dropped to zero after the add; decreases still go through.
        let stock = StockCache::new();
        stock.set("P1", 0);
        let cart = CartStore { stock, ..cart };
        let items = cart.update_quantity("U1", "P1", QuantityChange::Decrease).await.unwrap();
        assert_eq!(items[0].quantity.value(), 1);
        assert!(matches!(cart.update_quantity("U1", "P1", QuantityChange::Decrease).await, Err(StorefrontError::Validation(_))));
        assert_eq!(api.call_count("update_cart_quantity"), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_items_untouched() {
        let api = FakeApi::with_products(vec![product("P1", 10, 0, 9), product("P2", 5, 0, 9)]);
        let cart = store(api.clone(), &stocked(&api));
        cart.add_item("U1", "P1", 1).await.unwrap();
        let before = cart.snapshot().await;

        for method in ["add_to_cart", "update_cart_quantity", "remove_from_cart"] {
            api.fail(method);
        }
        assert!(cart.add_item("U1", "P2", 1).await.is_err());
        assert!(cart.update_quantity("U1", "P1", QuantityChange::Increase).await.is_err());
        assert!(cart.remove_item("U1", "P1").await.is_err());
        assert_eq!(cart.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_clear_empties_regardless_of_contents() {
        let api = FakeApi::with_products(vec![product("P1", 10, 0, 9), product("P2", 5, 0, 9)]);
        let cart = store(api.clone(), &stocked(&api));
        cart.add_item("U1", "P1", 3).await.unwrap();
        cart.add_item("U1", "P2", 1).await.unwrap();
        cart.clear().await;
        assert!(cart.is_empty().await);
        assert_eq!(api.calls().iter().filter(|c| c.contains("remove")).count(), 0);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let api = FakeApi::with_products(vec![product("P1", 10, 0, 9), product("P2", 5, 0, 9)]);
        let cart = Arc::new(store(api.clone(), &stocked(&api)));
        cart.add_item("U1", "P1", 1).await.unwrap();

        // The add answers late with a list that still holds P1 ...
        let gate = api.hold("add_to_cart");
        let slow = {
            let cart = cart.clone();
            tokio::spawn(async move { cart.add_item("U1", "P2", 1).await })
        };
        while api.call_count("add_to_cart") < 2 {
            tokio::task::yield_now().await;
        }
        // ... while the later remove of P1 lands first.
        let after_remove = cart.remove_item("U1", "P1").await.unwrap();
        assert_eq!(after_remove.len(), 1);
        gate.notify_one();
        slow.await.unwrap().unwrap();

        let items = cart.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "P2");
    }

    #[tokio::test]
    async fn test_response_after_clear_is_discarded() {
        let api = FakeApi::with_products(vec![product("P1", 10, 0, 9)]);
        let cart = Arc::new(store(api.clone(), &stocked(&api)));
        let gate = api.hold("fetch_cart");
        api.state().carts.insert("U1".into(), vec![crate::domain::aggregates::cart::tests::item("P1", 10, 0, 1)]);
        let slow = {
            let cart = cart.clone();
            tokio::spawn(async move { cart.fetch("U1").await })
        };
        while api.call_count("fetch_cart") < 1 {
            tokio::task::yield_now().await;
        }
        cart.clear().await;
        gate.notify_one();
        slow.await.unwrap().unwrap();
        assert!(cart.is_empty().await);
    }
}
