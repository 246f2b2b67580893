//! OpenSASE Storefront client core
//!
//! Client-side state for the OpenSASE shop and admin panel, kept in sync with
//! the REST backend.
//!
//! ## Features
//! - Cart mirror with stock-aware quantity guards
//! - Checkout state machine (Stripe redirect or cash on delivery)
//! - Order tracking with cancel / return guards
//! - Admin order status, mark-as-paid and catalog management
//! - Distributor applications and dashboard metrics polling
//!
//! Stale responses are fenced per entity: a reply that arrives after a newer
//! one for the same cart or order has been applied is dropped.

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod poll;
pub mod store;

use thiserror::Error;

use crate::api::ClientError;
use crate::domain::aggregates::{ApplicationError, CartError, OrderAction, OrderError, OrderStatus, ProductError};

pub use crate::app::AppState;
pub use crate::config::ClientConfig;
pub use crate::domain::events::{EventBus, StoreEvent};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    /// Caught before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("Only {available} in stock for this item")]
    StockExceeded { product_id: String, requested: u32, available: u32 },

    #[error("Cannot {action} an order that is {status}")]
    ActionNotPermitted { action: OrderAction, status: OrderStatus },

    #[error(transparent)]
    Api(#[from] ClientError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorefrontError {
    /// Text to put in front of the user. Backend messages pass through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// True for failures caught client-side, before any network traffic.
    pub fn is_preflight(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::StockExceeded { .. } | Self::ActionNotPermitted { .. })
    }
}

impl From<CartError> for StorefrontError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::StockExceeded { product_id, requested, available } => Self::StockExceeded { product_id, requested, available },
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<OrderError> for StorefrontError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotPermitted { action, status } => Self::ActionNotPermitted { action, status },
        }
    }
}

impl From<ProductError> for StorefrontError {
    fn from(err: ProductError) -> Self { Self::Validation(err.to_string()) }
}

impl From<ApplicationError> for StorefrontError {
    fn from(err: ApplicationError) -> Self { Self::Validation(err.to_string()) }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
