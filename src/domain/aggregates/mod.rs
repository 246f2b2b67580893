//! Aggregates module
pub mod product;
pub mod cart;
pub mod order;
pub mod review;
pub mod distributor;
pub mod analytics;

pub use product::{Brand, Category, Product, ProductDraft, ProductError, StockCache, TaxonomyDraft};
pub use cart::{Cart, CartError, CartItem, QuantityChange};
pub use order::{order_total, AddressInfo, CheckoutReceipt, NewOrder, Order, OrderAction, OrderError, OrderLine, OrderStatus, PaymentCapture, PaymentMethod, PaymentStatus};
pub use review::{Review, ReviewDraft};
pub use distributor::{ApplicationDraft, ApplicationError, ApplicationStatus, Decision, DistributorApplication};
pub use analytics::{DailySales, DashboardMetrics, SalesSummary};
