//! Admin dashboard metrics
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::api::AdminApi;
use crate::domain::aggregates::DashboardMetrics;
use crate::domain::events::EventBus;
use crate::{Result, StorefrontError};

pub struct DashboardStore {
    api: Arc<dyn AdminApi>,
    events: EventBus,
    metrics: RwLock<Option<(DashboardMetrics, DateTime<Utc>)>>,
}

impl DashboardStore {
    pub fn new(api: Arc<dyn AdminApi>, events: EventBus) -> Self {
        Self { api, events, metrics: RwLock::new(None) }
    }

    pub async fn metrics(&self) -> Option<DashboardMetrics> {
        self.metrics.read().await.as_ref().map(|(m, _)| m.clone())
    }

    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.metrics.read().await.as_ref().map(|(_, at)| *at)
    }

    /// On failure the previous metrics stay in place.
    pub async fn refresh(&self) -> Result<DashboardMetrics> {
        let fresh = self.api.dashboard_metrics().await.map_err(|e| {
            let err = StorefrontError::from(e);
            tracing::error!(error = %err, "dashboard metrics request failed");
            self.events.error(err.user_message());
            err
        })?;
        tracing::debug!(orders = fresh.total_orders, revenue = %fresh.total_revenue, "dashboard metrics refreshed");
        *self.metrics.write().await = Some((fresh.clone(), Utc::now()));
        Ok(fresh)
    }
}
