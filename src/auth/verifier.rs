// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification against the identity provider.
//!
//! The request pipeline only knows the [`TokenVerifier`] trait. Which
//! implementation backs it is decided once at startup:
//!
//! - [`FirebaseVerifier`] when `FIREBASE_PROJECT_ID` is configured
//! - [`UnconfiguredVerifier`] otherwise, failing every call with
//!   `ProviderUnavailable`
//! - [`InsecureVerifier`] for local development (`dev` feature only)

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::claims::{FirebaseClaims, MAX_SUBJECT_LEN};
use super::{AuthError, Identity, JwksManager};

/// Clock skew tolerance (60 seconds).
pub const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verifies a bearer credential and yields the caller's identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token`. Read-only; never caches the resulting identity.
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;

    /// Whether the provider can currently verify tokens.
    async fn is_ready(&self) -> bool {
        true
    }
}

/// Firebase Auth ID token verifier.
///
/// Checks the RS256 signature against Google's secure-token keys, then the
/// issuer, audience, expiry and subject rules Firebase documents.
pub struct FirebaseVerifier {
    project_id: String,
    issuer: String,
    jwks: JwksManager,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>, jwks: JwksManager) -> Self {
        let project_id = project_id.into();
        Self {
            issuer: format!("https://securetoken.google.com/{project_id}"),
            project_id,
            jwks,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.project_id]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "aud", "iss"]);
        validation
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::MalformedToken);
        }
        let kid = header.kid.ok_or(AuthError::MalformedToken)?;

        let (decoding_key, algorithm) = self.jwks.get_decoding_key(&kid).await?;
        let token_data = decode::<FirebaseClaims>(token, &decoding_key, &self.validation(algorithm))?;

        check_claims(&token_data.claims, Utc::now().timestamp())?;
        Ok(Identity::from_claims(token_data.claims))
    }

    async fn is_ready(&self) -> bool {
        self.jwks.is_cached().await || self.jwks.refresh().await.is_ok()
    }
}

/// Claim rules not covered by `jsonwebtoken::Validation`.
fn check_claims(claims: &FirebaseClaims, now: i64) -> Result<(), AuthError> {
    if claims.sub.is_empty() || claims.sub.chars().count() > MAX_SUBJECT_LEN {
        return Err(AuthError::InvalidSubject);
    }

    let latest = now + CLOCK_SKEW_LEEWAY as i64;
    if claims.iat > latest || claims.auth_time.is_some_and(|t| t > latest) {
        return Err(AuthError::TokenNotYetValid);
    }

    Ok(())
}

/// Verifier used when no identity provider is configured.
pub struct UnconfiguredVerifier;

#[async_trait]
impl TokenVerifier for UnconfiguredVerifier {
    async fn verify(&self, _token: &str) -> Result<Identity, AuthError> {
        Err(AuthError::ProviderUnavailable(
            "identity provider is not configured".to_string(),
        ))
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

/// Development verifier: decodes claims without checking the signature.
///
/// WARNING: This must only be used in development environments.
#[cfg(any(test, feature = "dev"))]
pub struct InsecureVerifier;

#[cfg(any(test, feature = "dev"))]
#[async_trait]
impl TokenVerifier for InsecureVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let token_data = jsonwebtoken::dangerous::insecure_decode::<FirebaseClaims>(token)
            .map_err(|_| AuthError::MalformedToken)?;
        let claims = token_data.claims;

        let now = Utc::now().timestamp();
        if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
            return Err(AuthError::TokenExpired);
        }
        check_claims(&claims, now)?;

        Ok(Identity::from_claims(claims))
    }
}
