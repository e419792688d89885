// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Bot store round trip.
    pub storage: String,
    /// Identity provider (token verifier) status.
    pub auth: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn status_str(ok: bool, failed: &str) -> String {
    if ok { "ok" } else { failed }.to_string()
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let storage_ok = match state.bots.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Bot store health check failed");
            false
        }
    };
    let auth_ok = state.verifier.is_ready().await;
    let all_ok = storage_ok && auth_ok;

    let response = ReadyResponse {
        status: status_str(all_ok, "degraded"),
        checks: HealthChecks {
            service: "ok".to_string(),
            storage: status_str(storage_ok, "unavailable"),
            auth: status_str(auth_ok, "unavailable"),
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if all dependencies are available.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UnconfiguredVerifier;
    use crate::rate_limit::InMemoryRateLimitStore;
    use crate::storage::InMemoryBotStore;
    use crate::testing::{test_state, FailingBotStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn healthy_when_store_and_verifier_are_ready() {
        let state = test_state(Arc::new(InMemoryBotStore::new()));
        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn degraded_when_store_fails() {
        let state = test_state(Arc::new(FailingBotStore));
        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.checks.storage, "unavailable");
        assert_eq!(body.checks.auth, "ok");
    }

    #[tokio::test]
    async fn degraded_without_identity_provider() {
        let state = AppState::new(
            Arc::new(InMemoryBotStore::new()),
            Arc::new(UnconfiguredVerifier),
            Arc::new(InMemoryRateLimitStore::new()),
        );
        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.auth, "unavailable");
    }

    #[tokio::test]
    async fn liveness_is_unconditional() {
        let Json(body) = liveness().await;
        assert_eq!(body.status, "ok");
    }
}
