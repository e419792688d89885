// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client address extraction for rate limit keys.
//!
//! Priority:
//! 1. `X-Forwarded-For` (first address in the chain)
//! 2. `X-Real-IP`
//! 3. Socket peer address (`ConnectInfo`, set by
//!    `into_make_service_with_connect_info`)
//!
//! The proxy headers are client-controlled unless a proxy overwrites them, so
//! they are only read when the caller says the service sits behind one.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::Request;

const IP_HEADERS: &[&str] = &["x-forwarded-for", "x-real-ip"];

/// Client address of a request, `None` when it cannot be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddress(pub Option<IpAddr>);

impl ClientAddress {
    #[must_use]
    pub fn from_request<T>(req: &Request<T>, trust_proxy_headers: bool) -> Self {
        if trust_proxy_headers {
            if let Some(ip) = Self::from_proxy_headers(req) {
                return Self(Some(ip));
            }
        }

        Self(
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip()),
        )
    }

    fn from_proxy_headers<T>(req: &Request<T>) -> Option<IpAddr> {
        IP_HEADERS.iter().find_map(|header| {
            req.headers()
                .get(*header)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(str::trim)
                .and_then(|s| s.parse::<IpAddr>().ok())
        })
    }
}

impl fmt::Display for ClientAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ip) => write!(f, "{ip}"),
            None => write!(f, "unknown"),
        }
    }
}
