// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared test fixtures and fakes.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use chrono::{DateTime, Utc};
use tower::ServiceExt;

use crate::auth::{AuthError, Identity, TokenVerifier};
use crate::models::{Bot, TrainingEntry};
use crate::rate_limit::InMemoryRateLimitStore;
use crate::state::AppState;
use crate::storage::{BotMutation, BotStore, InMemoryBotStore, StorageError, StorageResult};

pub fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn bot(id: &str, owner_id: &str, owner_phone_number: Option<&str>) -> Bot {
    Bot {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        owner_phone_number: owner_phone_number.map(str::to_string),
        name: format!("Bot {id}"),
        description: None,
        welcome_message: None,
        is_public: false,
        training: Vec::new(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn training_entry(id: &str) -> TrainingEntry {
    TrainingEntry {
        id: id.to_string(),
        question: format!("Question {id}"),
        answer: format!("Answer {id}"),
        created_at: fixed_time(),
    }
}

pub fn identity(subject_id: &str, phone_number: Option<&str>) -> Identity {
    let identity = Identity::new(subject_id);
    match phone_number {
        Some(phone) => identity.with_phone_number(phone),
        None => identity,
    }
}

/// Verifier accepting a fixed set of opaque tokens.
#[derive(Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, identity: Identity) -> Self {
        self.tokens.insert(token.to_string(), identity);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidSignature)
    }
}

fn disk_error() -> StorageError {
    StorageError::Io(io::Error::other("disk unavailable"))
}

/// Store whose every operation fails.
pub struct FailingBotStore;

#[async_trait]
impl BotStore for FailingBotStore {
    async fn get_by_id(&self, _bot_id: &str) -> StorageResult<Option<Bot>> {
        Err(disk_error())
    }

    async fn create(&self, _bot: &Bot) -> StorageResult<()> {
        Err(disk_error())
    }

    async fn update(&self, _bot: &Bot) -> StorageResult<()> {
        Err(disk_error())
    }

    async fn modify(&self, _bot_id: &str, _mutation: BotMutation) -> StorageResult<Bot> {
        Err(disk_error())
    }

    async fn delete(&self, _bot_id: &str) -> StorageResult<()> {
        Err(disk_error())
    }

    async fn list_by_owner(&self, _owner_id: &str) -> StorageResult<Vec<Bot>> {
        Err(disk_error())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Err(disk_error())
    }
}

/// Store that serves reads but fails every write.
pub struct ReadOnlyBotStore {
    inner: InMemoryBotStore,
}

impl ReadOnlyBotStore {
    pub fn with(bot: Bot) -> Self {
        Self {
            inner: InMemoryBotStore::with_bots([bot]),
        }
    }
}

#[async_trait]
impl BotStore for ReadOnlyBotStore {
    async fn get_by_id(&self, bot_id: &str) -> StorageResult<Option<Bot>> {
        self.inner.get_by_id(bot_id).await
    }

    async fn create(&self, _bot: &Bot) -> StorageResult<()> {
        Err(disk_error())
    }

    async fn update(&self, _bot: &Bot) -> StorageResult<()> {
        Err(disk_error())
    }

    async fn modify(&self, _bot_id: &str, _mutation: BotMutation) -> StorageResult<Bot> {
        Err(disk_error())
    }

    async fn delete(&self, _bot_id: &str) -> StorageResult<()> {
        Err(disk_error())
    }

    async fn list_by_owner(&self, owner_id: &str) -> StorageResult<Vec<Bot>> {
        self.inner.list_by_owner(owner_id).await
    }
}

/// Bearer tokens understood by [`test_state`].
pub const TOKEN_USER_A: &str = "token-user-a";
pub const TOKEN_USER_B: &str = "token-user-b";
pub const TOKEN_USER_B_PHONE: &str = "token-user-b-phone";

/// App state over `bots` with a [`StaticVerifier`] that knows:
///
/// - [`TOKEN_USER_A`]: `userA`, no phone
/// - [`TOKEN_USER_B`]: `userB`, no phone
/// - [`TOKEN_USER_B_PHONE`]: `userB`, phone `+1555`
pub fn test_state(bots: Arc<dyn BotStore>) -> AppState {
    let verifier = StaticVerifier::new()
        .with_token(TOKEN_USER_A, identity("userA", None))
        .with_token(TOKEN_USER_B, identity("userB", None))
        .with_token(TOKEN_USER_B_PHONE, identity("userB", Some("+1555")));
    AppState::new(
        bots,
        Arc::new(verifier),
        Arc::new(InMemoryRateLimitStore::new()),
    )
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
