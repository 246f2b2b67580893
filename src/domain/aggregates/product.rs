//! Catalog aggregates: products, brands, categories

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::value_objects::{Icon, Money};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub sale_price: Option<Money>,
    pub total_stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub average_review: Option<f64>,
}

impl Product {
    /// Sale price when one is set above zero, list price otherwise.
    pub fn effective_price(&self) -> Money {
        effective_price(self.price, self.sale_price)
    }
    pub fn is_in_stock(&self) -> bool { self.total_stock > 0 }
    pub fn thumbnail(&self) -> Option<&str> {
        self.image.as_deref().or_else(|| self.images.first().map(String::as_str))
    }
}

pub(crate) fn effective_price(price: Money, sale_price: Option<Money>) -> Money {
    match sale_price {
        Some(sale) if sale.is_positive() => sale,
        _ => price,
    }
}

/// Admin payload for creating or editing a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub total_stock: u32,
    pub images: Vec<String>,
}

impl ProductDraft {
    /// Field validation plus the cross-field rule that a sale price never exceeds the list price.
    pub fn check(&self) -> Result<(), ProductError> {
        self.validate().map_err(|e| ProductError::Invalid(e.to_string()))?;
        if let Some(sale) = self.sale_price {
            if sale > self.price { return Err(ProductError::SaleAbovePrice); }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Admin payload shared by brands and categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaxonomyDraft {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub icon: Option<Icon>,
    #[validate(url)]
    pub logo: Option<String>,
}

/// Last-fetched `totalStock` per product id, shared between the catalog and the cart.
///
/// Values can be stale relative to the server; the cart uses them only as a pre-flight ceiling.
#[derive(Clone, Debug, Default)]
pub struct StockCache {
    inner: Arc<DashMap<String, u32>>,
}

impl StockCache {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, product_id: &str) -> Option<u32> {
        self.inner.get(product_id).map(|entry| *entry.value())
    }

    pub fn set(&self, product_id: impl Into<String>, total_stock: u32) {
        self.inner.insert(product_id.into(), total_stock);
    }

    pub fn remove(&self, product_id: &str) { self.inner.remove(product_id); }

    /// Replaces the whole cache with the stock figures of a fresh product listing.
    pub fn replace_all(&self, products: &[Product]) {
        self.inner.clear();
        for p in products {
            self.inner.insert(p.id.clone(), p.total_stock);
        }
    }

    pub fn len(&self) -> usize { self.inner.len() }
    pub fn is_empty(&self) -> bool { self.inner.is_empty() }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { Invalid(String), SaleAbovePrice }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(e) => write!(f, "invalid product: {}", e),
            Self::SaleAbovePrice => write!(f, "sale price cannot exceed the list price"),
        }
    }
}
