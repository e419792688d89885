// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Bucket Sweeper
//!
//! Background task that evicts expired rate limit buckets on a fixed
//! interval, bounding the store's memory.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`; the server cancels it on
//! SIGTERM / Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::RateLimitStore;

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct BucketSweeper {
    store: Arc<dyn RateLimitStore>,
    interval: Duration,
}

impl BucketSweeper {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Rate limit sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Rate limit sweeper shutting down");
                    return;
                }
            }

            self.sweep_once().await;
        }
    }

    /// Evict expired buckets once. Returns how many were dropped.
    pub async fn sweep_once(&self) -> usize {
        let removed = self.store.sweep_expired(Utc::now()).await;
        if removed > 0 {
            debug!(removed, "Evicted expired rate limit buckets");
        }
        removed
    }
}
