//! Periodic expiry of cached responses
//!
//! The sweep period equals the TTL, so an entry stored just after a pass
//! can live for up to twice the TTL before it is removed.

use crate::cache::ResponseCache;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Spawn the background sweeper. It runs until the runtime shuts down or
/// the returned handle is aborted. `ttl` must be non-zero.
pub fn spawn_sweeper(cache: ResponseCache, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + ttl, ttl);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = cache.sweep(ttl).await;
            let remaining = cache.len().await;
            debug!(removed, remaining, "Swept expired cache entries");
        }
    })
}
