//! Catalog store
//!
//! Product, brand and category listings plus the admin edits on them. Every
//! product listing also refreshes the shared stock cache the cart guards on.

use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use crate::api::{AdminApi, ClientError, StorefrontApi};
use crate::domain::aggregates::{Brand, Category, Product, ProductDraft, Review, ReviewDraft, StockCache, TaxonomyDraft};
use crate::domain::events::EventBus;
use crate::store::sequence::RequestSequencer;
use crate::{Result, StorefrontError};

const PRODUCTS: &str = "products";

pub struct CatalogStore {
    api: Arc<dyn StorefrontApi>,
    admin: Arc<dyn AdminApi>,
    stock: StockCache,
    events: EventBus,
    products: RwLock<Vec<Product>>,
    brands: RwLock<Vec<Brand>>,
    categories: RwLock<Vec<Category>>,
    sequencer: RequestSequencer,
}

impl CatalogStore {
    pub fn new(api: Arc<dyn StorefrontApi>, admin: Arc<dyn AdminApi>, stock: StockCache, events: EventBus) -> Self {
        Self {
            api,
            admin,
            stock,
            events,
            products: RwLock::new(Vec::new()),
            brands: RwLock::new(Vec::new()),
            categories: RwLock::new(Vec::new()),
            sequencer: RequestSequencer::new(),
        }
    }

    pub async fn products(&self) -> Vec<Product> { self.products.read().await.clone() }
    pub async fn brands(&self) -> Vec<Brand> { self.brands.read().await.clone() }
    pub async fn categories(&self) -> Vec<Category> { self.categories.read().await.clone() }

    pub async fn find_product(&self, product_id: &str) -> Option<Product> {
        self.products.read().await.iter().find(|p| p.id == product_id).cloned()
    }

    pub async fn refresh_products(&self) -> Result<Vec<Product>> {
        let ticket = self.sequencer.issue(PRODUCTS);
        let fresh = self.api.list_products().await.map_err(|e| self.failed("list products", e))?;
        let mut products = self.products.write().await;
        if self.sequencer.commit(&ticket) {
            self.stock.replace_all(&fresh);
            *products = fresh;
            tracing::info!(count = products.len(), "products refreshed");
        }
        Ok(products.clone())
    }

    /// Reads one product and updates its cached stock figure.
    ///
    /// Fenced together with full listings: whichever answer was asked for last
    /// owns the stock figure.
    pub async fn product(&self, product_id: &str) -> Result<Product> {
        let ticket = self.sequencer.issue(PRODUCTS);
        let fresh = self.api.get_product(product_id).await.map_err(|e| self.failed("fetch product", e))?;
        let mut products = self.products.write().await;
        if !self.sequencer.commit(&ticket) {
            return Ok(products.iter().find(|p| p.id == fresh.id).cloned().unwrap_or(fresh));
        }
        self.stock.set(fresh.id.clone(), fresh.total_stock);
        match products.iter_mut().find(|p| p.id == fresh.id) {
            Some(slot) => *slot = fresh.clone(),
            None => products.push(fresh.clone()),
        }
        Ok(fresh)
    }

    pub async fn refresh_brands(&self) -> Result<Vec<Brand>> {
        let ticket = self.sequencer.issue("brands");
        let fresh = self.api.list_brands().await.map_err(|e| self.failed("list brands", e))?;
        let mut brands = self.brands.write().await;
        if self.sequencer.commit(&ticket) {
            *brands = fresh;
        }
        Ok(brands.clone())
    }

    pub async fn refresh_categories(&self) -> Result<Vec<Category>> {
        let ticket = self.sequencer.issue("categories");
        let fresh = self.api.list_categories().await.map_err(|e| self.failed("list categories", e))?;
        let mut categories = self.categories.write().await;
        if self.sequencer.commit(&ticket) {
            *categories = fresh;
        }
        Ok(categories.clone())
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        draft.check().map_err(|e| self.invalid(e))?;
        let created = self.admin.create_product(draft).await.map_err(|e| self.failed("create product", e))?;
        tracing::info!(product_id = %created.id, "product created");
        self.refresh_products().await?;
        Ok(created)
    }

    pub async fn update_product(&self, product_id: &str, draft: &ProductDraft) -> Result<Product> {
        draft.check().map_err(|e| self.invalid(e))?;
        let updated = self.admin.update_product(product_id, draft).await.map_err(|e| self.failed("update product", e))?;
        tracing::info!(product_id, "product updated");
        self.refresh_products().await?;
        Ok(updated)
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<()> {
        self.admin.delete_product(product_id).await.map_err(|e| self.failed("delete product", e))?;
        self.stock.remove(product_id);
        tracing::info!(product_id, "product deleted");
        self.refresh_products().await?;
        Ok(())
    }

    pub async fn create_brand(&self, draft: &TaxonomyDraft) -> Result<Brand> {
        draft.validate().map_err(|e| self.invalid(e))?;
        let created = self.admin.create_brand(draft).await.map_err(|e| self.failed("create brand", e))?;
        self.refresh_brands().await?;
        Ok(created)
    }

    pub async fn delete_brand(&self, brand_id: &str) -> Result<()> {
        self.admin.delete_brand(brand_id).await.map_err(|e| self.failed("delete brand", e))?;
        self.refresh_brands().await?;
        Ok(())
    }

    pub async fn create_category(&self, draft: &TaxonomyDraft) -> Result<Category> {
        draft.validate().map_err(|e| self.invalid(e))?;
        let created = self.admin.create_category(draft).await.map_err(|e| self.failed("create category", e))?;
        self.refresh_categories().await?;
        Ok(created)
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<()> {
        self.admin.delete_category(category_id).await.map_err(|e| self.failed("delete category", e))?;
        self.refresh_categories().await?;
        Ok(())
    }

    /// Posts a review. A missing rating or an empty comment never reaches the network.
    pub async fn submit_review(&self, draft: &ReviewDraft) -> Result<Review> {
        draft.validate().map_err(|e| self.invalid(e))?;
        let review = self.api.add_review(draft).await.map_err(|e| self.failed("add review", e))?;
        tracing::info!(product_id = %review.product_id, rating = review.rating, "review added");
        Ok(review)
    }

    pub async fn reviews(&self, product_id: &str) -> Result<Vec<Review>> {
        self.api.list_reviews(product_id).await.map_err(|e| self.failed("list reviews", e))
    }

    fn invalid(&self, err: impl Into<StorefrontError>) -> StorefrontError {
        let err = err.into();
        tracing::warn!(error = %err, "catalog change refused");
        self.events.warn(err.user_message());
        err
    }

    fn failed(&self, action: &str, err: ClientError) -> StorefrontError {
        let err = StorefrontError::from(err);
        tracing::error!(action, error = %err, "catalog request failed");
        self.events.error(err.user_message());
        err
    }
}
