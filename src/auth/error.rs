// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Variants keep the precise cause for logs. Clients only ever see one of two
//! messages: a missing credential, or an invalid one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorBody;

/// Body message when no credential was sent.
pub const AUTH_REQUIRED: &str = "Authentication required";

/// Body message when a credential was sent but could not be verified.
pub const INVALID_CREDENTIALS: &str = "Invalid authentication credentials";

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer header and no auth cookie
    #[error("No credential presented")]
    MissingCredential,
    /// Token is malformed
    #[error("Token is malformed")]
    MalformedToken,
    /// Token signature is invalid
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,
    /// Token issuer is invalid
    #[error("Token issuer is invalid")]
    InvalidIssuer,
    /// Token audience is invalid
    #[error("Token audience is invalid")]
    InvalidAudience,
    /// Token `iat`/`auth_time` lies in the future
    #[error("Token is not yet valid")]
    TokenNotYetValid,
    /// Token subject is empty or too long
    #[error("Token subject is invalid")]
    InvalidSubject,
    /// No matching key in JWKS
    #[error("No matching key found in JWKS")]
    NoMatchingKey,
    /// Verifier not configured, or its key endpoint is unreachable
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl AuthError {
    /// Whether this error means the caller never sent a credential.
    pub fn is_missing(&self) -> bool {
        matches!(self, AuthError::MissingCredential)
    }

    /// Message rendered in the response body.
    pub fn public_message(&self) -> &'static str {
        if self.is_missing() {
            AUTH_REQUIRED
        } else {
            INVALID_CREDENTIALS
        }
    }

    /// HTTP status for this error. Every variant is a 401 at the boundary.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            ErrorKind::InvalidSubject => AuthError::InvalidSubject,
            _ => AuthError::MalformedToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.public_message()))).into_response()
    }
}
