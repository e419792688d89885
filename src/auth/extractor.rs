// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential extraction and the `Auth` extractor.
//!
//! Handlers behind the authentication stage read the caller with:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity.subject_id is the verified user id
//! }
//! ```

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};

use super::{AuthError, Authenticator, Identity};

/// Prefix of a bearer `Authorization` header value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Cookie carrying the ID token for browser clients.
pub const DEFAULT_AUTH_COOKIE: &str = "__session";

/// Where a stage looks for the caller's credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// `Authorization: Bearer <token>` only.
    BearerHeader,
    /// Bearer header first, then the named cookie.
    BearerOrCookie(String),
}

impl CredentialSource {
    /// Pull the raw token out of `headers`.
    ///
    /// A header with any other scheme counts as no credential.
    pub fn extract<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        match self {
            CredentialSource::BearerHeader => bearer,
            CredentialSource::BearerOrCookie(name) => bearer.or_else(|| cookie(headers, name)),
        }
    }
}

fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Extractor for the authenticated caller.
///
/// Reads the identity attached by the authentication stage. On routes
/// without that stage it verifies the bearer header itself.
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
    Authenticator: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(Auth(identity));
        }

        let authenticator = Authenticator::from_ref(state);
        let identity = authenticator.authenticate(&parts.headers).await?;
        Ok(Auth(identity))
    }
}
