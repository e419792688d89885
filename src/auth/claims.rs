// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Firebase ID token claims and the per-request identity derived from them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest `sub` claim Firebase will issue.
pub const MAX_SUBJECT_LEN: usize = 128;

/// Claims carried by a Firebase Auth ID token.
///
/// See: https://firebase.google.com/docs/auth/admin/verify-id-tokens
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseClaims {
    /// Subject - the Firebase user id
    pub sub: String,

    /// Issuer (`https://securetoken.google.com/<project_id>`)
    #[serde(default)]
    pub iss: String,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,

    /// When the user actually signed in
    #[serde(default)]
    pub auth_time: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    /// E.164 phone number for phone sign-in
    #[serde(default)]
    pub phone_number: Option<String>,

    /// Provider details (`sign_in_provider`, linked identities)
    #[serde(default)]
    pub firebase: Option<FirebaseInfo>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FirebaseInfo {
    #[serde(default)]
    pub sign_in_provider: Option<String>,
}

/// The authenticated principal for one request.
///
/// Built fresh from a verified token on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable provider-issued user id (`sub`)
    pub subject_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: None,
            phone_number: None,
        }
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Create from verified token claims. Blank optional claims are dropped.
    pub fn from_claims(claims: FirebaseClaims) -> Self {
        Self {
            subject_id: claims.sub,
            email: claims.email.filter(|e| !e.is_empty()),
            phone_number: claims.phone_number.filter(|p| !p.is_empty()),
        }
    }
}
