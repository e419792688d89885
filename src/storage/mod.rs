// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Bot Storage Module
//!
//! Persistence for bot records behind the [`BotStore`] trait. Request
//! handlers and the ownership resolver only ever see the trait, so the
//! backing store can be swapped without touching the authorization layer.
//!
//! ## Backends
//!
//! - [`InMemoryBotStore`] - process-local map, used when `DATA_DIR` is unset
//!   and in tests
//! - [`FileBotStore`] - one JSON document per bot on local disk, the fallback
//!   used when no hosted document database is configured
//!
//! ## Storage Layout (file backend)
//!
//! ```text
//! $DATA_DIR/
//!   bots/
//!     {bot_id}.json
//! ```

use std::io;

use async_trait::async_trait;

use crate::models::Bot;

pub mod file_store;
pub mod memory;
pub mod ownership;
pub mod paths;

pub use file_store::FileBotStore;
pub use memory::InMemoryBotStore;
pub use ownership::{OwnedResource, OwnerMatch};
pub use paths::StoragePaths;

/// Longest accepted bot identifier.
pub const MAX_BOT_ID_LEN: usize = 128;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Entity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Storage not initialized
    #[error("Storage not initialized")]
    NotInitialized,
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// In-place edit applied to a stored bot by [`BotStore::modify`].
pub type BotMutation = Box<dyn FnOnce(&mut Bot) + Send>;

/// Key-value store for bot records.
#[async_trait]
pub trait BotStore: Send + Sync {
    /// Fetch a bot by id. `Ok(None)` when no such bot exists.
    async fn get_by_id(&self, bot_id: &str) -> StorageResult<Option<Bot>>;

    /// Insert a new bot. Fails with `AlreadyExists` on id collision.
    async fn create(&self, bot: &Bot) -> StorageResult<()>;

    /// Replace an existing bot. Fails with `NotFound` if it was never created.
    async fn update(&self, bot: &Bot) -> StorageResult<()>;

    /// Read, edit and persist a bot as one step, returning the stored result.
    ///
    /// No other write to the same bot can interleave with `mutation`. Fails
    /// with `NotFound` if the bot does not exist.
    async fn modify(&self, bot_id: &str, mutation: BotMutation) -> StorageResult<Bot>;

    /// Remove a bot. Fails with `NotFound` if absent.
    async fn delete(&self, bot_id: &str) -> StorageResult<()>;

    /// All bots whose `owner_id` equals `owner_id`, oldest first.
    async fn list_by_owner(&self, owner_id: &str) -> StorageResult<Vec<Bot>>;

    /// Cheap liveness probe used by the readiness endpoint.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Whether `bot_id` is safe to use as a storage key.
///
/// Ids are restricted to ASCII alphanumerics, `-` and `_` so they can never
/// address anything outside the bots directory.
pub fn is_valid_bot_id(bot_id: &str) -> bool {
    !bot_id.is_empty()
        && bot_id.len() <= MAX_BOT_ID_LEN
        && bot_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_id_validation() {
        assert!(is_valid_bot_id("bot_1"));
        assert!(is_valid_bot_id("3f2b-44aa"));
        assert!(!is_valid_bot_id(""));
        assert!(!is_valid_bot_id("../etc/passwd"));
        assert!(!is_valid_bot_id("a/b"));
        assert!(!is_valid_bot_id(&"x".repeat(MAX_BOT_ID_LEN + 1)));
    }

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err: StorageError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, StorageError::NotFound(_)));

        let err: StorageError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
