//! Application state container
//!
//! One instance per session. Owns every store, the shared stock cache and the
//! event bus, and the lifecycle of the background pollers.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{AdminApi, HttpApi, StorefrontApi};
use crate::config::ClientConfig;
use crate::domain::aggregates::{CartItem, Product, StockCache};
use crate::domain::events::{EventBus, StoreEvent};
use crate::poll::spawn_poll;
use crate::store::{AdminOrderStore, CartStore, CatalogStore, DashboardStore, DistributorStore, OrderStore};
use crate::Result;

pub struct AppState {
    pub config: ClientConfig,
    pub events: EventBus,
    pub stock: StockCache,
    pub catalog: Arc<CatalogStore>,
    pub cart: Arc<CartStore>,
    pub orders: Arc<OrderStore>,
    pub admin_orders: Arc<AdminOrderStore>,
    pub distributor: Arc<DistributorStore>,
    pub dashboard: Arc<DashboardStore>,
    shutdown: CancellationToken,
    pollers: Mutex<Vec<JoinHandle<()>>>,
}

impl AppState {
    /// Builds the stores over the HTTP backend named in `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = Arc::new(HttpApi::new(&config)?);
        Ok(Self::with_api(api, config))
    }

    pub fn with_api<A>(api: Arc<A>, config: ClientConfig) -> Self
    where
        A: StorefrontApi + AdminApi + 'static,
    {
        let shop: Arc<dyn StorefrontApi> = api.clone();
        let admin: Arc<dyn AdminApi> = api;
        let events = EventBus::new(config.event_capacity);
        let stock = StockCache::new();

        Self {
            catalog: Arc::new(CatalogStore::new(shop.clone(), admin.clone(), stock.clone(), events.clone())),
            cart: Arc::new(CartStore::new(shop.clone(), stock.clone(), events.clone())),
            orders: Arc::new(OrderStore::new(shop.clone(), events.clone())),
            admin_orders: Arc::new(AdminOrderStore::new(admin.clone(), events.clone())),
            distributor: Arc::new(DistributorStore::new(shop, admin.clone(), events.clone())),
            dashboard: Arc::new(DashboardStore::new(admin, events.clone())),
            config,
            events,
            stock,
            shutdown: CancellationToken::new(),
            pollers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> { self.events.subscribe() }

    /// Loads the product listing (filling the stock cache) and the user's cart together.
    pub async fn init(&self, user_id: &str) -> Result<(Vec<Product>, Vec<CartItem>)> {
        let loaded = tokio::try_join!(self.catalog.refresh_products(), self.cart.fetch(user_id))?;
        tracing::info!(user_id, products = loaded.0.len(), cart_items = loaded.1.len(), "storefront session ready");
        Ok(loaded)
    }

    /// Polls the user's distributor application status.
    pub async fn start_polling(&self, user_id: &str) {
        let distributor = self.distributor.clone();
        let user_id = user_id.to_string();
        let handle = spawn_poll("distributor-status", self.config.distributor_poll(), self.shutdown.child_token(), move || {
            let distributor = distributor.clone();
            let user_id = user_id.clone();
            async move { distributor.refresh_status(&user_id).await.map(|_| ()) }
        });
        self.pollers.lock().await.push(handle);
    }

    /// Polls dashboard metrics for an admin session.
    pub async fn start_dashboard_polling(&self) {
        let dashboard = self.dashboard.clone();
        let handle = spawn_poll("dashboard-metrics", self.config.dashboard_poll(), self.shutdown.child_token(), move || {
            let dashboard = dashboard.clone();
            async move { dashboard.refresh().await.map(|_| ()) }
        });
        self.pollers.lock().await.push(handle);
    }

    /// Stops every poller and waits for them to finish.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handles: Vec<_> = self.pollers.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "poller task ended abnormally");
            }
        }
        tracing::info!("storefront session closed");
    }
}
