//! Remote API gateway
//!
//! The stores only talk to the backend through these two traits. [`HttpApi`]
//! is the real implementation; tests swap in an in-memory one.

pub mod error;
pub mod http;
#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::domain::aggregates::{
    ApplicationDraft, ApplicationStatus, Brand, CartItem, Category, CheckoutReceipt, DashboardMetrics,
    DistributorApplication, NewOrder, Order, OrderStatus, PaymentCapture, Product, ProductDraft, Review,
    ReviewDraft, TaxonomyDraft,
};
use crate::domain::value_objects::Quantity;

pub use error::{ClientError, ClientResult, GENERIC_FAILURE};
pub use http::{ApiResponse, HttpApi};

/// Shopper-facing endpoints.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn list_products(&self) -> ClientResult<Vec<Product>>;
    async fn get_product(&self, product_id: &str) -> ClientResult<Product>;
    async fn list_brands(&self) -> ClientResult<Vec<Brand>>;
    async fn list_categories(&self) -> ClientResult<Vec<Category>>;

    /// Cart endpoints all answer with the full, current item list.
    async fn fetch_cart(&self, user_id: &str) -> ClientResult<Vec<CartItem>>;
    async fn add_to_cart(&self, user_id: &str, product_id: &str, quantity: Quantity) -> ClientResult<Vec<CartItem>>;
    async fn update_cart_quantity(&self, user_id: &str, product_id: &str, quantity: Quantity) -> ClientResult<Vec<CartItem>>;
    async fn remove_from_cart(&self, user_id: &str, product_id: &str) -> ClientResult<Vec<CartItem>>;

    async fn create_order(&self, order: &NewOrder) -> ClientResult<CheckoutReceipt>;
    async fn capture_payment(&self, capture: &PaymentCapture) -> ClientResult<Order>;
    async fn list_orders(&self, user_id: &str) -> ClientResult<Vec<Order>>;
    async fn get_order(&self, order_id: &str) -> ClientResult<Order>;
    async fn cancel_order(&self, order_id: &str) -> ClientResult<()>;
    async fn return_order(&self, order_id: &str) -> ClientResult<()>;

    async fn add_review(&self, review: &ReviewDraft) -> ClientResult<Review>;
    async fn list_reviews(&self, product_id: &str) -> ClientResult<Vec<Review>>;

    async fn submit_application(&self, draft: &ApplicationDraft) -> ClientResult<DistributorApplication>;
    /// `None` when the user never applied.
    async fn application_for_user(&self, user_id: &str) -> ClientResult<Option<DistributorApplication>>;
    async fn withdraw_application(&self, application_id: &str) -> ClientResult<DistributorApplication>;
}

/// Admin panel endpoints.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_all_orders(&self) -> ClientResult<Vec<Order>>;
    async fn get_order_details(&self, order_id: &str) -> ClientResult<Order>;
    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<()>;
    async fn mark_order_paid(&self, order_id: &str) -> ClientResult<()>;

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product>;
    async fn update_product(&self, product_id: &str, draft: &ProductDraft) -> ClientResult<Product>;
    async fn delete_product(&self, product_id: &str) -> ClientResult<()>;
    async fn create_brand(&self, draft: &TaxonomyDraft) -> ClientResult<Brand>;
    async fn delete_brand(&self, brand_id: &str) -> ClientResult<()>;
    async fn create_category(&self, draft: &TaxonomyDraft) -> ClientResult<Category>;
    async fn delete_category(&self, category_id: &str) -> ClientResult<()>;

    async fn list_applications(&self) -> ClientResult<Vec<DistributorApplication>>;
    async fn set_application_status(&self, application_id: &str, status: ApplicationStatus) -> ClientResult<DistributorApplication>;

    async fn dashboard_metrics(&self) -> ClientResult<DashboardMetrics>;
}
