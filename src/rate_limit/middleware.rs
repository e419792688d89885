// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rate limiting stage for Axum.
//!
//! ```rust,ignore
//! let limiter = RateLimiter::new(RateLimitPolicy::api(), store);
//! let app = Router::new()
//!     .route("/v1/bots", get(list_bots))
//!     .route_layer(axum::middleware::from_fn_with_state(limiter, rate_limit));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{ClientAddress, RateLimiter};

/// Count the request against `(client address, path)` and short-circuit with
/// the policy's error response once the window's budget is spent.
pub async fn rate_limit(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    let client = ClientAddress::from_request(&request, limiter.trusts_proxy_headers());
    let key = format!("{client}:{}", request.uri().path());

    let decision = limiter.check(&key).await;
    if !decision.allowed {
        tracing::warn!(
            policy = limiter.policy().name,
            client = %client,
            path = %request.uri().path(),
            retry_after = decision.retry_after_secs,
            "Rate limit exceeded"
        );
        return limiter.reject(&decision);
    }

    let mut response = next.run(request).await;
    decision.apply_headers(response.headers_mut());
    response
}
