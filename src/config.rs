//! Client configuration

use std::env;
use std::time::Duration;

use crate::{Result, StorefrontError};

/// Connection and polling settings for the storefront client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "http://localhost:5000")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Distributor application status poll interval in seconds
    pub distributor_poll_secs: u64,

    /// Admin dashboard metrics poll interval in seconds
    pub dashboard_poll_secs: u64,

    /// Capacity of the store event channel
    pub event_capacity: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
            distributor_poll_secs: 30,
            dashboard_poll_secs: 60,
            event_capacity: 64,
        }
    }

    /// Loads `.env` if present, then reads `STOREFRONT_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = env::var("STOREFRONT_API_URL")
            .map_err(|e| StorefrontError::Config(format!("Missing environment variable 'STOREFRONT_API_URL': {}", e)))?;
        let mut config = Self::new(base_url);
        config.timeout_secs = read_secs("STOREFRONT_TIMEOUT_SECS", config.timeout_secs)?;
        config.distributor_poll_secs = read_secs("STOREFRONT_DISTRIBUTOR_POLL_SECS", config.distributor_poll_secs)?;
        config.dashboard_poll_secs = read_secs("STOREFRONT_DASHBOARD_POLL_SECS", config.dashboard_poll_secs)?;

        tracing::info!(base_url = %config.base_url, "storefront configuration loaded");
        Ok(config)
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    pub fn with_poll_intervals(mut self, distributor_secs: u64, dashboard_secs: u64) -> Self {
        self.distributor_poll_secs = distributor_secs;
        self.dashboard_poll_secs = dashboard_secs;
        self
    }

    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
    pub fn distributor_poll(&self) -> Duration { Duration::from_secs(self.distributor_poll_secs) }
    pub fn dashboard_poll(&self) -> Duration { Duration::from_secs(self.dashboard_poll_secs) }
}

fn read_secs(var: &str, default: u64) -> Result<u64> {
    match env::var(var) {
        Ok(raw) => parse_secs(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_secs(var: &str, raw: &str) -> Result<u64> {
    let secs = raw.trim().parse::<u64>().map_err(|e| StorefrontError::Config(format!("Invalid {}: {}", var, e)))?;
    if secs == 0 {
        return Err(StorefrontError::Config(format!("{} must be greater than zero", var)));
    }
    Ok(secs)
}
