//! Fixed-interval staleness pollers
//!
//! A poller ticks once right away, then every `period`. There is no backoff: a
//! failed tick is logged and the next one runs on schedule. Cancelling the
//! token ends the loop between ticks.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub fn spawn_poll<F, Fut>(name: &'static str, period: Duration, shutdown: CancellationToken, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = crate::Result<()>> + Send,
{
    tokio::spawn(async move {
        tracing::info!(poller = name, period_secs = period.as_secs(), "poller started");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!(poller = name, "poller stopped");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(e) = tick().await {
                        tracing::warn!(poller = name, error = %e, "poll failed");
                    }
                }
            }
        }
    })
}
