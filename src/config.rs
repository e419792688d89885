// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for the file-backed bot store | unset (in-memory) |
//! | `FIREBASE_PROJECT_ID` | Firebase project, expected issuer/audience | unset (auth unavailable) |
//! | `FIREBASE_JWKS_URL` | Override of the secure-token JWKS endpoint | Google endpoint |
//! | `AUTH_COOKIE_NAME` | Cookie read on browser routes | `__session` |
//! | `AUTH_INSECURE_DEV` | Skip signature checks (`dev` feature only) | `false` |
//! | `RATE_LIMIT_SWEEP_SECS` | Interval between bucket sweeps | `60` |
//! | `TRUST_PROXY_HEADERS` | Key rate limits on `X-Forwarded-For`/`X-Real-IP` | `true` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::jwks::FIREBASE_JWKS_URL;
use crate::auth::DEFAULT_AUTH_COOKIE;
use crate::rate_limit::sweeper::DEFAULT_SWEEP_INTERVAL;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the bot data directory.
///
/// When unset, bots are kept in memory and lost on restart.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const FIREBASE_PROJECT_ID_ENV: &str = "FIREBASE_PROJECT_ID";
pub const FIREBASE_JWKS_URL_ENV: &str = "FIREBASE_JWKS_URL";
pub const AUTH_COOKIE_NAME_ENV: &str = "AUTH_COOKIE_NAME";

/// Only honored when built with the `dev` feature.
pub const AUTH_INSECURE_DEV_ENV: &str = "AUTH_INSECURE_DEV";

pub const RATE_LIMIT_SWEEP_SECS_ENV: &str = "RATE_LIMIT_SWEEP_SECS";

/// Set to `false` when clients reach the service directly, so forged proxy
/// headers cannot pick their own rate limit bucket.
pub const TRUST_PROXY_HEADERS_ENV: &str = "TRUST_PROXY_HEADERS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: Option<PathBuf>,
    pub firebase_project_id: Option<String>,
    pub firebase_jwks_url: String,
    pub auth_cookie_name: String,
    pub insecure_dev_auth: bool,
    pub rate_limit_sweep_interval: Duration,
    pub trust_proxy_headers: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host: IpAddr = parse_or(get(HOST_ENV), HOST_ENV, || {
            IpAddr::from([0, 0, 0, 0])
        })?;
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, || DEFAULT_PORT)?;
        let sweep_secs: u64 = parse_or(get(RATE_LIMIT_SWEEP_SECS_ENV), RATE_LIMIT_SWEEP_SECS_ENV, || {
            DEFAULT_SWEEP_INTERVAL.as_secs()
        })?;
        if sweep_secs == 0 {
            return Err(ConfigError::Invalid {
                name: RATE_LIMIT_SWEEP_SECS_ENV,
                value: "0".to_string(),
            });
        }

        let insecure_dev_auth =
            parse_flag(get(AUTH_INSECURE_DEV_ENV), AUTH_INSECURE_DEV_ENV, false)?;
        let trust_proxy_headers =
            parse_flag(get(TRUST_PROXY_HEADERS_ENV), TRUST_PROXY_HEADERS_ENV, true)?;

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            data_dir: get(DATA_DIR_ENV).map(PathBuf::from),
            firebase_project_id: get(FIREBASE_PROJECT_ID_ENV),
            firebase_jwks_url: get(FIREBASE_JWKS_URL_ENV)
                .unwrap_or_else(|| FIREBASE_JWKS_URL.to_string()),
            auth_cookie_name: get(AUTH_COOKIE_NAME_ENV)
                .unwrap_or_else(|| DEFAULT_AUTH_COOKIE.to_string()),
            insecure_dev_auth,
            rate_limit_sweep_interval: Duration::from_secs(sweep_secs),
            trust_proxy_headers,
            log_format,
        })
    }
}

fn parse_or<T, D>(value: Option<String>, name: &'static str, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    D: FnOnce() -> T,
{
    match value {
        None => Ok(default()),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn parse_flag(
    value: Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match value.as_deref() {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            name,
            value: other.to_string(),
        }),
    }
}
