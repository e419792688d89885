// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Rate Limiting Module
//!
//! Fixed-window request counting keyed by `(client address, route path)`.
//!
//! ## Bucket Lifecycle
//!
//! ```text
//! Absent -> Active(1) -> Active(n < max) -> Exhausted(max)
//!                ^                                |
//!                +------- window expiry ----------+
//! ```
//!
//! Expired buckets are evicted by [`BucketSweeper`]. Counts live in an
//! injected [`RateLimitStore`]; the default store is process-local, so limits
//! are per instance.

pub mod client;
pub mod limiter;
pub mod middleware;
pub mod policy;
pub mod store;
pub mod sweeper;

pub use client::ClientAddress;
pub use limiter::{RateLimitDecision, RateLimiter};
pub use middleware::rate_limit;
pub use policy::RateLimitPolicy;
pub use store::{Bucket, Hit, InMemoryRateLimitStore, RateLimitStore};
pub use sweeper::BucketSweeper;
