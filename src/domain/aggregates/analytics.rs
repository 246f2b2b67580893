//! Sales analytics for the admin dashboard

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::aggregates::order::{Order, OrderStatus, PaymentStatus};
use crate::domain::value_objects::Money;

/// Metrics as served by the backend's dashboard endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_revenue: Money,
    pub total_orders: u64,
    pub total_products: u64,
    #[serde(default)]
    pub pending_orders: u64,
    #[serde(default)]
    pub pending_applications: u64,
    #[serde(default)]
    pub sales_by_day: Vec<DailySales>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: Money,
    pub orders: u64,
}

/// Locally computed view over a list of orders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SalesSummary {
    pub revenue: Money,
    pub collected: Money,
    pub outstanding: Money,
    pub order_count: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_day: Vec<DailySales>,
}

impl SalesSummary {
    /// Revenue ignores rejected, cancelled and returned orders; counts include every order.
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut summary = Self { order_count: orders.len(), ..Self::default() };
        let mut days: BTreeMap<NaiveDate, (Money, u64)> = BTreeMap::new();
        for order in orders {
            *summary.by_status.entry(order.order_status.as_str()).or_insert(0) += 1;
            if !counts_as_revenue(order.order_status) { continue; }
            summary.revenue = summary.revenue.add(&order.total_amount);
            match order.payment_status {
                PaymentStatus::Paid => summary.collected = summary.collected.add(&order.total_amount),
                PaymentStatus::Pending => summary.outstanding = summary.outstanding.add(&order.total_amount),
            }
            let day = days.entry(order.order_date.date_naive()).or_insert((Money::zero(), 0));
            day.0 = day.0.add(&order.total_amount);
            day.1 += 1;
        }
        summary.by_day = days.into_iter().map(|(date, (revenue, orders))| DailySales { date, revenue, orders }).collect();
        summary
    }
}

fn counts_as_revenue(status: OrderStatus) -> bool {
    !matches!(status, OrderStatus::Rejected | OrderStatus::Cancelled | OrderStatus::Returned)
}
