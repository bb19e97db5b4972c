//! External rate feeds.
//!
//! The validation band is anchored to rates observed on other venues.
//! Feeds are behind a trait so the service can run against fixed rates
//! in tests and simulations, a process-local updatable rate in the
//! gateway, or a real market poller later.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use lendbook_common::{Bps, Result};

/// A source of an external market APY.
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Current APY at this venue, in basis points.
    async fn current_bps(&self) -> Result<Bps>;

    /// Human-readable venue label, used in logs and the rates API.
    fn source(&self) -> &str;
}

/// Feed pinned to one rate forever. Test and simulation backend.
pub struct StaticRateFeed {
    source: String,
    rate_bps: Bps,
}

impl StaticRateFeed {
    pub fn new(source: impl Into<String>, rate_bps: Bps) -> Self {
        Self {
            source: source.into(),
            rate_bps,
        }
    }
}

#[async_trait]
impl RateFeed for StaticRateFeed {
    async fn current_bps(&self) -> Result<Bps> {
        Ok(self.rate_bps)
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// Feed whose rate can be updated while the service is running.
///
/// Clones share the same cell, so an updater task can hold one handle
/// while the service reads through another.
#[derive(Clone)]
pub struct SharedRateFeed {
    source: String,
    rate_bps: Arc<RwLock<Bps>>,
}

impl SharedRateFeed {
    pub fn new(source: impl Into<String>, initial_bps: Bps) -> Self {
        Self {
            source: source.into(),
            rate_bps: Arc::new(RwLock::new(initial_bps)),
        }
    }

    /// Publish a new observed rate.
    pub fn set(&self, rate_bps: Bps) {
        *self.rate_bps.write() = rate_bps;
    }
}

#[async_trait]
impl RateFeed for SharedRateFeed {
    async fn current_bps(&self) -> Result<Bps> {
        Ok(*self.rate_bps.read())
    }

    fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_feed_is_constant() {
        let feed = StaticRateFeed::new("venue-a", 500);
        assert_eq!(feed.current_bps().await.unwrap(), 500);
        assert_eq!(feed.source(), "venue-a");
    }

    #[tokio::test]
    async fn test_shared_feed_updates_through_clones() {
        let feed = SharedRateFeed::new("venue-b", 350);
        let handle = feed.clone();

        handle.set(425);
        assert_eq!(feed.current_bps().await.unwrap(), 425);
    }
}
