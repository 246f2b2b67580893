//! Cart Aggregate
//!
//! Local mirror of the server-side cart. Items are only ever replaced wholesale
//! from server responses; the planning methods below decide whether a mutation
//! may be sent at all.

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::product::effective_price;
use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: Money,
    #[serde(default)]
    pub sale_price: Option<Money>,
    pub quantity: Quantity,
}

impl CartItem {
    pub fn unit_price(&self) -> Money { effective_price(self.price, self.sale_price) }
    pub fn line_total(&self) -> Money { self.unit_price().multiply(self.quantity.value()) }
    pub fn thumbnail(&self) -> Option<&str> {
        self.image.as_deref().or_else(|| self.images.first().map(String::as_str))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantityChange { Increase, Decrease }

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }
    pub fn from_items(items: Vec<CartItem>) -> Self { Self { items } }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn find(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.find(product_id).map_or(0, |i| i.quantity.value())
    }
    pub fn subtotal(&self) -> Money { self.items.iter().map(CartItem::line_total).sum() }

    /// Adopts the server's item list as-is.
    pub fn replace(&mut self, items: Vec<CartItem>) { self.items = items; }
    pub fn clear(&mut self) { self.items.clear(); }

    /// Checks an "add to cart" against the cached stock ceiling.
    ///
    /// `available` is `None` when the product's stock is not cached; the server decides then.
    pub fn plan_add(&self, product_id: &str, quantity: Quantity, available: Option<u32>) -> Result<(), CartError> {
        let requested = self.quantity_of(product_id).saturating_add(quantity.value());
        check_stock(product_id, requested, available)
    }

    /// Computes the quantity to send for a one-step change of an existing line.
    ///
    /// Increases are refused when `current + 1` exceeds `available`. Decreases
    /// ignore stock but never go below one.
    pub fn plan_change(&self, product_id: &str, change: QuantityChange, available: Option<u32>) -> Result<Quantity, CartError> {
        let item = self.find(product_id).ok_or_else(|| CartError::ItemNotFound(product_id.to_string()))?;
        match change {
            QuantityChange::Increase => {
                let next = item.quantity.increment();
                check_stock(product_id, next.value(), available)?;
                Ok(next)
            }
            QuantityChange::Decrease => item.quantity.decrement().ok_or(CartError::BelowMinimum),
        }
    }
}

fn check_stock(product_id: &str, requested: u32, available: Option<u32>) -> Result<(), CartError> {
    match available {
        Some(available) if requested > available => Err(CartError::StockExceeded {
            product_id: product_id.to_string(),
            requested,
            available,
        }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    ItemNotFound(String),
    StockExceeded { product_id: String, requested: u32, available: u32 },
    BelowMinimum,
}
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "item {} is not in the cart", id),
            Self::StockExceeded { available, .. } => write!(f, "only {} can be added for this item", available),
            Self::BelowMinimum => write!(f, "quantity cannot go below 1"),
        }
    }
}
