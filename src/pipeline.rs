// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resource access pipeline.
//!
//! Composes the request gates in a fixed order in front of a router's
//! handlers:
//!
//! ```text
//! rate limit -> authenticate -> require ownership -> handler
//! ```
//!
//! Each stage is an independent `from_fn_with_state` layer and may answer
//! the request itself. Stages are attached with `route_layer`, so unmatched
//! paths still produce the router's 404/405 rather than a 401.

use axum::{middleware::from_fn_with_state, Router};

use crate::auth::{require_auth, require_ownership, Authenticator, OwnershipResolver};
use crate::rate_limit::{rate_limit, RateLimiter};

#[derive(Clone, Default)]
pub struct Pipeline {
    rate_limiter: Option<RateLimiter>,
    authenticator: Option<Authenticator>,
    ownership: Option<OwnershipResolver>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rate_limit(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn authenticate(mut self, authenticator: Authenticator) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Requires [`Pipeline::authenticate`]; without it every request is a 401.
    pub fn require_ownership(mut self, resolver: OwnershipResolver) -> Self {
        self.ownership = Some(resolver);
        self
    }

    /// Wrap every route currently in `router`.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // The last layer added runs first.
        let mut router = router;
        if let Some(resolver) = self.ownership {
            router = router.route_layer(from_fn_with_state(resolver, require_ownership));
        }
        if let Some(authenticator) = self.authenticator {
            router = router.route_layer(from_fn_with_state(authenticator, require_auth));
        }
        if let Some(limiter) = self.rate_limiter {
            router = router.route_layer(from_fn_with_state(limiter, rate_limit));
        }
        router
    }
}
