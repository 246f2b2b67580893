//! Order Aggregate
//!
//! Orders are snapshots taken at checkout. Line prices and `total_amount` are
//! fixed at creation; afterwards only the status fields move, and only under
//! the guards defined here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::domain::aggregates::cart::CartItem;
use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    InProcess,
    InShipping,
    Shipped,
    Delivered,
    Rejected,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        Self::Pending, Self::Confirmed, Self::InProcess, Self::InShipping, Self::Shipped,
        Self::Delivered, Self::Rejected, Self::Cancelled, Self::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProcess => "inProcess",
            Self::InShipping => "inShipping",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
        }
    }

    /// A user may cancel anything that has not already been cancelled, returned or delivered.
    pub fn allows_cancel(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Returned | Self::Delivered)
    }

    pub fn allows_return(&self) -> bool { *self == Self::Delivered }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "stripe", alias = "Stripe")]
    Stripe,
    #[serde(rename = "cod", alias = "Cash on Delivery")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn redirects(&self) -> bool { matches!(self, Self::Stripe) }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Stripe => write!(f, "Stripe"), Self::CashOnDelivery => write!(f, "Cash on Delivery") }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus { #[default] Pending, Paid }

/// Line snapshot captured at order creation; `price` is the unit price actually charged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: Money,
    pub quantity: Quantity,
}

impl OrderLine {
    pub fn line_total(&self) -> Money { self.price.multiply(self.quantity.value()) }
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            title: item.title.clone(),
            image: item.thumbnail().map(str::to_string),
            price: item.unit_price(),
            quantity: item.quantity,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    #[serde(default)]
    pub address_id: Option<String>,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "pincode is required"))]
    pub pincode: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub cart_items: Vec<OrderLine>,
    pub address_info: AddressInfo,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total_amount: Money,
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub order_update_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payer_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderAction { Cancel, Return, MarkPaid }

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Cancel => write!(f, "cancel"), Self::Return => write!(f, "return"), Self::MarkPaid => write!(f, "mark as paid") }
    }
}

impl Order {
    pub fn can_cancel(&self) -> bool { self.order_status.allows_cancel() }
    pub fn can_return(&self) -> bool { self.order_status.allows_return() }

    /// Only delivered cash-on-delivery orders still awaiting payment can be settled by an admin.
    pub fn can_mark_paid(&self) -> bool {
        self.payment_method == PaymentMethod::CashOnDelivery
            && self.order_status == OrderStatus::Delivered
            && self.payment_status == PaymentStatus::Pending
    }

    pub fn permits(&self, action: OrderAction) -> bool {
        match action {
            OrderAction::Cancel => self.can_cancel(),
            OrderAction::Return => self.can_return(),
            OrderAction::MarkPaid => self.can_mark_paid(),
        }
    }

    pub fn ensure(&self, action: OrderAction) -> Result<(), OrderError> {
        if self.permits(action) { Ok(()) } else { Err(OrderError::NotPermitted { action, status: self.order_status }) }
    }

    pub fn item_count(&self) -> u32 { self.cart_items.iter().map(|l| l.quantity.value()).sum() }
}

/// Sum of `(salePrice > 0 ? salePrice : price) * quantity` over the items.
pub fn order_total(items: &[CartItem]) -> Money { items.iter().map(CartItem::line_total).sum() }

/// Checkout payload sent to the create-order endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: String,
    pub cart_items: Vec<OrderLine>,
    pub address_info: AddressInfo,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total_amount: Money,
    pub order_date: DateTime<Utc>,
    pub order_update_date: DateTime<Utc>,
}

impl NewOrder {
    pub fn from_cart(user_id: impl Into<String>, items: &[CartItem], address_info: AddressInfo, payment_method: PaymentMethod, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            cart_items: items.iter().map(OrderLine::from).collect(),
            address_info,
            order_status: OrderStatus::Pending,
            payment_method,
            payment_status: PaymentStatus::Pending,
            total_amount: order_total(items),
            order_date: now,
            order_update_date: now,
        }
    }
}

/// What the backend hands back after creating an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: String,
    #[serde(default, alias = "approvalURL", alias = "redirectUrl")]
    pub approval_url: Option<String>,
}

/// Sent back after the payment processor redirects the shopper home.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCapture {
    pub order_id: String,
    pub payment_id: String,
    pub payer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NotPermitted { action: OrderAction, status: OrderStatus } }
impl std::error::Error for OrderError {}
impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::NotPermitted { action, status } => write!(f, "cannot {} an order that is {}", action, status) }
    }
}
