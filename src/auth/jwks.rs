// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Security
//!
//! - Keys are fetched from Google's secure-token endpoint over HTTPS
//! - Keys are cached with a configurable TTL
//! - An unknown `kid` forces one refresh, which picks up key rotation
//!
//! Only signing keys are cached here. Verified identities never are.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;

/// Public keys used to sign Firebase ID tokens.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Default JWKS cache TTL (1 hour). Google rotates these keys every few hours.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Transport timeout for the key endpoint.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JWKS cache entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS manager with caching.
#[derive(Clone)]
pub struct JwksManager {
    jwks_url: String,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager for `jwks_url`.
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(format!("HTTP client: {e}")))?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            client,
        })
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Seed the cache with a known key set.
    pub fn with_keys(mut self, jwks: JwkSet) -> Self {
        self.cache = Arc::new(RwLock::new(Some(CacheEntry {
            jwks,
            fetched_at: Instant::now(),
        })));
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Fetch JWKS (with caching).
    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        self.refresh().await
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::ProviderUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))
    }

    /// Get a decoding key for the given key ID.
    pub async fn get_decoding_key(&self, kid: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.get_jwks().await?;
        if let Some(jwk) = find_key(&jwks, kid) {
            return jwk_to_decoding_key(jwk);
        }

        // Unknown kid: the keys may have rotated since the last fetch.
        tracing::debug!(kid, "Signing key not cached, refreshing JWKS");
        let jwks = self.refresh().await?;
        let jwk = find_key(&jwks, kid).ok_or(AuthError::NoMatchingKey)?;
        jwk_to_decoding_key(jwk)
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<JwkSet, AuthError> {
        let jwks = self.fetch_jwks().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        match &*cache {
            Some(entry) => entry.fetched_at.elapsed() < self.cache_ttl,
            None => false,
        }
    }
}

fn find_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    jwks.keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}

/// Convert a JWK to a DecodingKey. Firebase only signs with RSA keys.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|e| AuthError::ProviderUnavailable(format!("Bad RSA key in JWKS: {e}")))?;

            let alg = match jwk.common.key_algorithm {
                Some(jsonwebtoken::jwk::KeyAlgorithm::RS384) => Algorithm::RS384,
                Some(jsonwebtoken::jwk::KeyAlgorithm::RS512) => Algorithm::RS512,
                _ => Algorithm::RS256,
            };

            Ok((key, alg))
        }
        _ => Err(AuthError::NoMatchingKey),
    }
}
