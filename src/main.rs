//! OpenSASE Storefront - headless client session
//!
//! Connects to the backend named by `STOREFRONT_API_URL`, loads the catalog and
//! (when `STOREFRONT_USER_ID` is set) the user's cart and orders, logs a summary
//! and exits. `STOREFRONT_WATCH=1` keeps the pollers running until Ctrl-C.

use anyhow::Result;
use opensase_storefront::{AppState, ClientConfig, StoreEvent};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = ClientConfig::from_env()?;
    let app = AppState::new(config)?;
    let mut events = app.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                StoreEvent::Warning(message) => tracing::warn!("{}", message),
                StoreEvent::Error(message) => tracing::error!("{}", message),
                other => tracing::debug!(?other, "store event"),
            }
        }
    });

    app.catalog.refresh_brands().await?;
    app.catalog.refresh_categories().await?;

    match std::env::var("STOREFRONT_USER_ID").ok().filter(|u| !u.is_empty()) {
        Some(user_id) => {
            let (products, cart) = app.init(&user_id).await?;
            let orders = app.orders.list(&user_id).await?;
            let subtotal = app.cart.snapshot().await.subtotal();
            tracing::info!(products = products.len(), cart_items = cart.len(), %subtotal, orders = orders.len(), "🛒 storefront loaded for {}", user_id);
            if watch_enabled() {
                app.start_polling(&user_id).await;
            }
        }
        None => {
            let products = app.catalog.refresh_products().await?;
            let in_stock = products.iter().filter(|p| p.is_in_stock()).count();
            tracing::info!(products = products.len(), in_stock, "🛒 catalog loaded");
        }
    }

    if watch_enabled() {
        tracing::info!("watching for changes, Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
    }
    app.shutdown().await;
    Ok(())
}

fn watch_enabled() -> bool {
    matches!(std::env::var("STOREFRONT_WATCH").as_deref(), Ok("1") | Ok("true"))
}
