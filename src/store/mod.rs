//! Client-side stores
//!
//! Each store mirrors one slice of backend state. Reads are cheap clones; every
//! mutation goes to the backend first and only the server's answer is applied.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod dashboard;
pub mod distributor;
pub mod order;
pub mod sequence;

pub use admin::AdminOrderStore;
pub use cart::CartStore;
pub use catalog::CatalogStore;
pub use dashboard::DashboardStore;
pub use distributor::DistributorStore;
pub use order::{CheckoutOutcome, CheckoutPhase, OrderStore};
pub use sequence::{RequestSequencer, Ticket};
