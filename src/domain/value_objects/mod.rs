//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-negative monetary amount as carried on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(MoneyError::Negative(amount)); }
        Ok(Self(amount))
    }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_positive(&self) -> bool { self.0 > Decimal::ZERO }
    pub fn add(&self, other: &Money) -> Money { Money(self.0 + other.0) }
    pub fn multiply(&self, qty: u32) -> Money { Money(self.0 * Decimal::from(qty)) }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self { value.0 }
}

impl From<u32> for Money {
    fn from(value: u32) -> Self { Money(Decimal::from(value)) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self { iter.fold(Money::zero(), |acc, m| acc.add(&m)) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum MoneyError { Negative(Decimal) }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Negative(v) => write!(f, "amount must not be negative, got {}", v) }
    }
}

/// Line-item quantity, always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 { return Err(QuantityError::Zero); }
        Ok(Self(value))
    }
    pub fn value(&self) -> u32 { self.0 }
    pub fn increment(&self) -> Self { Self(self.0.saturating_add(1)) }
    /// `None` when the result would drop below one.
    pub fn decrement(&self) -> Option<Self> {
        if self.0 <= 1 { None } else { Some(Self(self.0 - 1)) }
    }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self { value.0 }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum QuantityError { Zero }
impl std::error::Error for QuantityError {}
impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "quantity must be at least 1") }
}

/// Symbolic icon reference attached to brands and categories.
///
/// Keys are resolved once at deserialization time; anything outside the known
/// set lands on [`Icon::Unknown`] so renderers always have a fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Icon {
    Shirt,
    Baby,
    Watch,
    Footprints,
    ShoppingBag,
    Smartphone,
    Laptop,
    Headphones,
    Home,
    Gift,
    Sparkles,
    #[default]
    Unknown,
}

impl Icon {
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "shirt" => Self::Shirt,
            "baby" => Self::Baby,
            "watch" => Self::Watch,
            "footprints" => Self::Footprints,
            "shoppingbag" | "shopping-bag" => Self::ShoppingBag,
            "smartphone" => Self::Smartphone,
            "laptop" => Self::Laptop,
            "headphones" => Self::Headphones,
            "home" => Self::Home,
            "gift" => Self::Gift,
            "sparkles" => Self::Sparkles,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shirt => "shirt",
            Self::Baby => "baby",
            Self::Watch => "watch",
            Self::Footprints => "footprints",
            Self::ShoppingBag => "shopping-bag",
            Self::Smartphone => "smartphone",
            Self::Laptop => "laptop",
            Self::Headphones => "headphones",
            Self::Home => "home",
            Self::Gift => "gift",
            Self::Sparkles => "sparkles",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool { *self != Self::Unknown }
}

impl From<String> for Icon {
    fn from(value: String) -> Self { Self::from_key(&value) }
}

impl From<Icon> for String {
    fn from(value: Icon) -> Self { value.as_str().to_string() }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rejects_negative() {
        assert!(Money::new(Decimal::new(-1, 0)).is_err());
        assert!(serde_json::from_str::<Money>("-5").is_err());
        let m: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(m.amount(), Decimal::new(125, 1));
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [Money::from(80).multiply(2), Money::from(50)].into_iter().sum();
        assert_eq!(total.amount(), Decimal::new(210, 0));
    }

    #[test]
    fn test_quantity_bounds() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
        assert_eq!(Quantity::ONE.decrement(), None);
        assert_eq!(Quantity::new(3).unwrap().decrement().unwrap().value(), 2);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }

    #[test]
    fn test_icon_fallback() {
        let icon: Icon = serde_json::from_str("\"Shirt\"").unwrap();
        assert_eq!(icon, Icon::Shirt);
        let icon: Icon = serde_json::from_str("\"rocket-ship\"").unwrap();
        assert_eq!(icon, Icon::Unknown);
        assert!(!icon.is_known());
        assert_eq!(serde_json::to_string(&Icon::ShoppingBag).unwrap(), "\"shopping-bag\"");
    }
}
