// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication stage for Axum.
//!
//! Verifies the caller's credential and attaches the resulting [`Identity`]
//! to the request extensions, where the `Auth` extractor and the ownership
//! stage pick it up.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/v1/bots", get(list_bots))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         Authenticator::new(verifier),
//!         require_auth,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, CredentialSource, Identity, TokenVerifier};

/// Credential source plus the verifier that checks it.
#[derive(Clone)]
pub struct Authenticator {
    verifier: Arc<dyn TokenVerifier>,
    source: CredentialSource,
}

impl Authenticator {
    /// Bearer header only.
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            verifier,
            source: CredentialSource::BearerHeader,
        }
    }

    /// Also accept the credential from `cookie_name` (browser clients).
    pub fn with_cookie(mut self, cookie_name: impl Into<String>) -> Self {
        self.source = CredentialSource::BearerOrCookie(cookie_name.into());
        self
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// Resolve the caller from request headers.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = self
            .source
            .extract(headers)
            .ok_or(AuthError::MissingCredential)?;
        self.verifier.verify(token).await
    }
}

/// Reject unauthenticated requests with 401; otherwise attach the identity.
pub async fn require_auth(
    State(authenticator): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticator.authenticate(request.headers()).await {
        Ok(identity) => {
            tracing::debug!(subject_id = %identity.subject_id, "Request authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            match &err {
                AuthError::ProviderUnavailable(reason) => {
                    tracing::warn!(path = %request.uri().path(), reason = %reason, "Token verification unavailable");
                }
                other => {
                    tracing::debug!(path = %request.uri().path(), error = %other, "Authentication rejected");
                }
            }
            err.into_response()
        }
    }
}
