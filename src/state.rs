// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{Authenticator, OwnershipResolver, TokenVerifier, DEFAULT_AUTH_COOKIE};
use crate::rate_limit::{RateLimitPolicy, RateLimitStore, RateLimiter};
use crate::storage::BotStore;

/// One limiter per predefined policy, all counting in the same store.
#[derive(Clone)]
pub struct RateLimits {
    pub store: Arc<dyn RateLimitStore>,
    pub api: RateLimiter,
    pub auth: RateLimiter,
    pub chat: RateLimiter,
    pub training: RateLimiter,
}

impl RateLimits {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            api: RateLimiter::new(RateLimitPolicy::api(), store.clone()),
            auth: RateLimiter::new(RateLimitPolicy::auth(), store.clone()),
            chat: RateLimiter::new(RateLimitPolicy::chat(), store.clone()),
            training: RateLimiter::new(RateLimitPolicy::training(), store.clone()),
            store,
        }
    }

    pub fn with_trusted_proxy_headers(self, trust: bool) -> Self {
        Self {
            api: self.api.with_trusted_proxy_headers(trust),
            auth: self.auth.with_trusted_proxy_headers(trust),
            chat: self.chat.with_trusted_proxy_headers(trust),
            training: self.training.with_trusted_proxy_headers(trust),
            store: self.store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub bots: Arc<dyn BotStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub rate_limits: RateLimits,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(
        bots: Arc<dyn BotStore>,
        verifier: Arc<dyn TokenVerifier>,
        rate_limit_store: Arc<dyn RateLimitStore>,
    ) -> Self {
        Self {
            bots,
            verifier,
            rate_limits: RateLimits::new(rate_limit_store),
            cookie_name: DEFAULT_AUTH_COOKIE.to_string(),
        }
    }

    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }

    /// Key rate limits on proxy headers only when `trust` is set.
    pub fn with_trusted_proxy_headers(mut self, trust: bool) -> Self {
        self.rate_limits = self.rate_limits.with_trusted_proxy_headers(trust);
        self
    }

    /// Bearer-header authenticator for API routes.
    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.verifier.clone())
    }

    /// Authenticator that also reads the session cookie.
    pub fn browser_authenticator(&self) -> Authenticator {
        self.authenticator().with_cookie(self.cookie_name.clone())
    }

    pub fn ownership(&self) -> OwnershipResolver {
        OwnershipResolver::new(self.bots.clone())
    }
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(state: &AppState) -> Self {
        state.authenticator()
    }
}
