// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Firebase ID token authentication and bot ownership for the AsQue API.
//!
//! ## Auth Flow
//!
//! 1. The dashboard signs the user in with Firebase Auth
//! 2. It sends `Authorization: Bearer <ID token>` (or the `__session` cookie
//!    on browser routes)
//! 3. The server:
//!    - Fetches Google's secure-token JWKS via HTTPS
//!    - Verifies signature, expiry, issuer, audience
//!    - Extracts `sub` as the user id, plus `email` and `phone_number`
//! 4. Bot-scoped routes then check ownership, falling back to the phone
//!    number when the user id changed
//!
//! ## Security
//!
//! - Identities are never cached; each request is verified
//! - JWKS is fetched over HTTPS and cached with TTL
//! - Clock skew tolerance is 60 seconds
//! - Ownership checks fail closed

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod ownership;
pub mod verifier;

pub use claims::{FirebaseClaims, Identity};
pub use error::{AuthError, AUTH_REQUIRED, INVALID_CREDENTIALS};
pub use extractor::{Auth, CredentialSource, DEFAULT_AUTH_COOKIE};
pub use jwks::JwksManager;
pub use middleware::{require_auth, Authenticator};
pub use ownership::{require_ownership, OwnershipResolver, ACCESS_DENIED, BOT_ID_REQUIRED};
#[cfg(any(test, feature = "dev"))]
pub use verifier::InsecureVerifier;
pub use verifier::{FirebaseVerifier, TokenVerifier, UnconfiguredVerifier};
