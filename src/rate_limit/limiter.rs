// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-window rate limiter.

use std::sync::Arc;

use axum::{
    http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RateLimitPolicy, RateLimitStore};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Outcome of one limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    /// Whole seconds until the window resets, at least 1.
    pub retry_after_secs: i64,
}

impl RateLimitDecision {
    /// Set `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
    /// (epoch seconds), plus `Retry-After` when the request was denied.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(X_RATELIMIT_RESET, HeaderValue::from(self.reset_at.timestamp()));
        if !self.allowed {
            headers.insert(RETRY_AFTER, HeaderValue::from(self.retry_after_secs));
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitedBody<'a> {
    success: bool,
    error: &'a str,
    retry_after: i64,
    timestamp: DateTime<Utc>,
}

/// A policy bound to a bucket store.
#[derive(Clone)]
pub struct RateLimiter {
    policy: Arc<RateLimitPolicy>,
    window: chrono::Duration,
    store: Arc<dyn RateLimitStore>,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy, store: Arc<dyn RateLimitStore>) -> Self {
        let window = chrono::Duration::from_std(policy.window)
            .unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            policy: Arc::new(policy),
            window,
            store,
            trust_proxy_headers: true,
        }
    }

    /// Whether client addresses may come from `X-Forwarded-For`/`X-Real-IP`.
    /// Defaults to `true`.
    pub fn with_trusted_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    pub fn trusts_proxy_headers(&self) -> bool {
        self.trust_proxy_headers
    }

    /// Count a request from `client_key` now.
    pub async fn check(&self, client_key: &str) -> RateLimitDecision {
        self.check_at(client_key, Utc::now()).await
    }

    /// Count a request from `client_key` at `now`.
    pub async fn check_at(&self, client_key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let key = format!("{}:{client_key}", self.policy.name);
        let hit = self
            .store
            .hit(&key, now, self.window, self.policy.max)
            .await;

        let millis_left = (hit.bucket.reset_at - now).num_milliseconds().max(0);
        RateLimitDecision {
            allowed: hit.allowed,
            limit: self.policy.max,
            remaining: self.policy.max.saturating_sub(hit.bucket.count),
            reset_at: hit.bucket.reset_at,
            retry_after_secs: ((millis_left + 999) / 1000).max(1),
        }
    }

    /// Terminal response for a denied request.
    pub fn reject(&self, decision: &RateLimitDecision) -> Response {
        let body = RateLimitedBody {
            success: false,
            error: &self.policy.message,
            retry_after: decision.retry_after_secs,
            timestamp: Utc::now(),
        };
        let mut response = (self.policy.status_code, Json(body)).into_response();
        decision.apply_headers(response.headers_mut());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::InMemoryRateLimitStore;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn limiter(max: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            RateLimitPolicy::new(
                "test",
                std::time::Duration::from_secs(window_secs),
                max,
                "Too many requests",
            ),
            Arc::new(InMemoryRateLimitStore::new()),
        )
    }

    #[tokio::test]
    async fn five_per_minute_window() {
        let limiter = limiter(5, 60);
        let key = "203.0.113.7:/v1/bots";

        let mut remaining = Vec::new();
        for i in 0..5 {
            let decision = limiter.check_at(key, t0() + Duration::seconds(i)).await;
            assert!(decision.allowed);
            remaining.push(decision.remaining);
        }
        assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

        let denied = limiter.check_at(key, t0() + Duration::seconds(10)).await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.retry_after_secs, 50);

        let after_reset = limiter.check_at(key, t0() + Duration::seconds(61)).await;
        assert!(after_reset.allowed);
        assert_eq!(after_reset.remaining, 4);
        assert_eq!(after_reset.reset_at, t0() + Duration::seconds(121));
    }

    #[tokio::test]
    async fn retry_after_rounds_up() {
        let limiter = limiter(1, 60);
        limiter.check_at("k", t0()).await;
        let denied = limiter
            .check_at("k", t0() + Duration::milliseconds(59_500))
            .await;
        assert_eq!(denied.retry_after_secs, 1);

        let denied = limiter
            .check_at("k", t0() + Duration::milliseconds(10_100))
            .await;
        assert_eq!(denied.retry_after_secs, 50);
    }

    #[tokio::test]
    async fn policies_sharing_a_store_do_not_collide() {
        let store: Arc<dyn RateLimitStore> = Arc::new(InMemoryRateLimitStore::new());
        let strict = RateLimiter::new(RateLimitPolicy::auth(), store.clone());
        let loose = RateLimiter::new(RateLimitPolicy::api(), store.clone());

        for _ in 0..5 {
            strict.check_at("ip:/p", t0()).await;
        }
        assert!(!strict.check_at("ip:/p", t0()).await.allowed);
        assert!(loose.check_at("ip:/p", t0()).await.allowed);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn reject_renders_headers_and_body() {
        let limiter = limiter(1, 60);
        limiter.check_at("k", t0()).await;
        let decision = limiter.check_at("k", t0() + Duration::seconds(30)).await;

        let response = limiter.reject(&decision);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let headers = response.headers();
        assert_eq!(headers[RETRY_AFTER], "30");
        assert_eq!(headers[X_RATELIMIT_LIMIT], "1");
        assert_eq!(headers[X_RATELIMIT_REMAINING], "0");
        assert_eq!(
            headers[X_RATELIMIT_RESET],
            (t0() + Duration::seconds(60)).timestamp().to_string().as_str()
        );

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Too many requests");
        assert_eq!(body["retryAfter"], 30);
    }

    #[tokio::test]
    async fn allowed_decision_omits_retry_after() {
        let limiter = limiter(3, 60);
        let decision = limiter.check_at("k", t0()).await;
        let mut headers = HeaderMap::new();
        decision.apply_headers(&mut headers);
        assert!(headers.get(RETRY_AFTER).is_none());
        assert_eq!(headers[X_RATELIMIT_REMAINING], "2");
    }
}
