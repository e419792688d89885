// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bucket storage for the fixed-window limiter.
//!
//! The limiter talks to an injected [`RateLimitStore`] so a shared backend can
//! replace the process-local map when the service runs as several instances.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

/// Request count for one key in its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

/// Result of counting one request against a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Bucket state after the hit was applied.
    pub bucket: Bucket,
    /// False when the bucket was already at `max`; the count is left as is.
    pub allowed: bool,
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request for `key` at `now`.
    ///
    /// Opens a new window (`count = 1`, `reset_at = now + window`) when the key
    /// has no bucket or `now` is past its `reset_at`. Otherwise increments the
    /// count unless it already reached `max`.
    async fn hit(&self, key: &str, now: DateTime<Utc>, window: Duration, max: u32) -> Hit;

    /// Drop every bucket whose window ended before `now`. Returns how many.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> usize;

    /// Number of live buckets.
    async fn len(&self) -> usize;
}

/// Process-local bucket map. Correct for single-instance deployments only.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, now: DateTime<Utc>, window: Duration, max: u32) -> Hit {
        let mut buckets = self.buckets.lock().await;

        match buckets.get_mut(key) {
            Some(bucket) if now <= bucket.reset_at => {
                if bucket.count >= max {
                    return Hit {
                        bucket: *bucket,
                        allowed: false,
                    };
                }
                bucket.count += 1;
                Hit {
                    bucket: *bucket,
                    allowed: true,
                }
            }
            _ => {
                let bucket = Bucket {
                    count: 1,
                    reset_at: now + window,
                };
                buckets.insert(key.to_string(), bucket);
                Hit {
                    bucket,
                    allowed: true,
                }
            }
        }
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| bucket.reset_at >= now);
        before - buckets.len()
    }

    async fn len(&self) -> usize {
        self.buckets.lock().await.len()
    }
}
