// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rate limit policies.
//!
//! | Policy | Window | Max |
//! |--------|--------|-----|
//! | `api` | 15 min | 100 |
//! | `auth` | 15 min | 5 |
//! | `chat` | 1 min | 30 |
//! | `training` | 1 min | 10 |

use std::time::Duration;

use axum::http::StatusCode;

/// Window length and request budget for one class of traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Short name, also used to namespace bucket keys.
    pub name: &'static str,
    pub window: Duration,
    pub max: u32,
    /// Error message returned when the budget is spent.
    pub message: String,
    pub status_code: StatusCode,
}

impl RateLimitPolicy {
    /// A policy with the default 429 status. `max` is clamped to at least 1.
    pub fn new(
        name: &'static str,
        window: Duration,
        max: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name,
            window,
            max: max.max(1),
            message: message.into(),
            status_code: StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn with_status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    /// General API traffic.
    pub fn api() -> Self {
        Self::new(
            "api",
            Duration::from_secs(15 * 60),
            100,
            "Too many requests from this IP, please try again later.",
        )
    }

    /// Authentication attempts.
    pub fn auth() -> Self {
        Self::new(
            "auth",
            Duration::from_secs(15 * 60),
            5,
            "Too many authentication attempts, please try again later.",
        )
    }

    /// Chat messages to a deployed bot.
    pub fn chat() -> Self {
        Self::new(
            "chat",
            Duration::from_secs(60),
            30,
            "Too many chat messages, please slow down.",
        )
    }

    /// Training submissions.
    pub fn training() -> Self {
        Self::new(
            "training",
            Duration::from_secs(60),
            10,
            "Too many training requests, please wait a moment.",
        )
    }
}
