// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints.

use axum::Json;

use crate::auth::{Auth, Identity};
use crate::error::ApiResponse;

/// Get the identity behind the presented credential.
///
/// Accepts the session cookie as well as the bearer header, so the
/// dashboard can probe its login state on page load.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller identity", body = Identity),
        (status = 401, description = "Missing or invalid credential"),
        (status = 429, description = "Too many authentication attempts")
    )
)]
pub async fn get_current_identity(Auth(identity): Auth) -> Json<ApiResponse<Identity>> {
    ApiResponse::ok(identity)
}

#[cfg(test)]
mod tests {
    use crate::{
        api::router,
        auth::AUTH_REQUIRED,
        storage::InMemoryBotStore,
        testing::{body_json, send, test_state, TOKEN_USER_B_PHONE},
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;

    fn app() -> axum::Router {
        router(test_state(Arc::new(InMemoryBotStore::new())))
    }

    #[tokio::test]
    async fn bearer_identity() {
        let request = Request::builder()
            .uri("/v1/auth/me")
            .header("authorization", format!("Bearer {TOKEN_USER_B_PHONE}"))
            .body(Body::empty())
            .unwrap();
        let response = send(&app(), request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["subjectId"], "userB");
        assert_eq!(body["data"]["phoneNumber"], "+1555");
    }

    #[tokio::test]
    async fn session_cookie_identity() {
        let request = Request::builder()
            .uri("/v1/auth/me")
            .header("cookie", format!("__session={TOKEN_USER_B_PHONE}"))
            .body(Body::empty())
            .unwrap();
        let response = send(&app(), request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn auth_attempts_are_limited_to_five() {
        let app = app();
        for _ in 0..5 {
            let request = Request::builder()
                .uri("/v1/auth/me")
                .body(Body::empty())
                .unwrap();
            let response = send(&app, request).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(response).await["error"], AUTH_REQUIRED);
        }

        let request = Request::builder()
            .uri("/v1/auth/me")
            .header("authorization", format!("Bearer {TOKEN_USER_B_PHONE}"))
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_json(response).await["error"],
            "Too many authentication attempts, please try again later."
        );
    }
}
