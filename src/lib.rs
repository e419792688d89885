// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AsQue Server - Chatbot builder back end
//!
//! HTTP API through which users create, train and publish chatbots. Every
//! request passes a pipeline of gates before reaching a handler.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Firebase ID token authentication and bot ownership
//! - `pipeline` - Composition of the request gates
//! - `rate_limit` - Fixed-window rate limiting
//! - `storage` - Bot persistence (in-memory or file-backed)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod rate_limit;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
