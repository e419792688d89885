// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed bot store.
//!
//! Each bot is one pretty-printed JSON document under `bots/`. Writes go to a
//! uniquely named temporary file in the same directory and are renamed into
//! place, so a reader never sees a half-written record.
//!
//! Mutations are serialized by a store-wide write lock. Reads take no lock.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{is_valid_bot_id, BotMutation, BotStore, StorageError, StoragePaths, StorageResult};
use crate::models::Bot;

/// Bot store persisting JSON documents on the local filesystem.
///
/// Clones share the write lock.
#[derive(Debug, Clone)]
pub struct FileBotStore {
    paths: StoragePaths,
    initialized: bool,
    write_lock: Arc<Mutex<()>>,
}

impl FileBotStore {
    /// Create a store rooted at `paths`.
    ///
    /// Does NOT create the directory layout. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create and initialize a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let mut store = Self::new(StoragePaths::new(root));
        store.initialize()?;
        Ok(store)
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create the directory layout. Safe to call multiple times.
    pub fn initialize(&mut self) -> StorageResult<()> {
        fs::create_dir_all(self.paths.bots_dir())?;
        self.initialized = true;
        Ok(())
    }

    fn ensure_initialized(&self) -> StorageResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }

    fn exists(&self, path: impl AsRef<Path>) -> bool {
        File::open(path.as_ref()).is_ok()
    }

    fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write a JSON file (atomic write via rename of a private temp file).
    fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| self.paths.root());
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        temp.persist(path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }

    /// Ids of every stored bot document.
    fn list_ids(&self) -> StorageResult<Vec<String>> {
        let dir = self.paths.bots_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl BotStore for FileBotStore {
    async fn get_by_id(&self, bot_id: &str) -> StorageResult<Option<Bot>> {
        self.ensure_initialized()?;
        if !is_valid_bot_id(bot_id) {
            return Ok(None);
        }

        let path = self.paths.bot(bot_id);
        if !self.exists(&path) {
            return Ok(None);
        }
        self.read_json(path).map(Some)
    }

    async fn create(&self, bot: &Bot) -> StorageResult<()> {
        self.ensure_initialized()?;
        if !is_valid_bot_id(&bot.id) {
            return Err(StorageError::NotFound(format!("Bot {}", bot.id)));
        }

        let path = self.paths.bot(&bot.id);
        let _guard = self.write_lock.lock().await;
        if self.exists(&path) {
            return Err(StorageError::AlreadyExists(format!("Bot {}", bot.id)));
        }
        self.write_json(path, bot)
    }

    async fn update(&self, bot: &Bot) -> StorageResult<()> {
        self.ensure_initialized()?;
        let path = self.paths.bot(&bot.id);
        let _guard = self.write_lock.lock().await;
        if !is_valid_bot_id(&bot.id) || !self.exists(&path) {
            return Err(StorageError::NotFound(format!("Bot {}", bot.id)));
        }
        self.write_json(path, bot)
    }

    async fn modify(&self, bot_id: &str, mutation: BotMutation) -> StorageResult<Bot> {
        self.ensure_initialized()?;
        let path = self.paths.bot(bot_id);
        let _guard = self.write_lock.lock().await;
        if !is_valid_bot_id(bot_id) || !self.exists(&path) {
            return Err(StorageError::NotFound(format!("Bot {bot_id}")));
        }

        let original: Bot = self.read_json(&path)?;
        let mut bot = original.clone();
        mutation(&mut bot);
        if bot != original {
            self.write_json(&path, &bot)?;
        }
        Ok(bot)
    }

    async fn delete(&self, bot_id: &str) -> StorageResult<()> {
        self.ensure_initialized()?;
        let path = self.paths.bot(bot_id);
        let _guard = self.write_lock.lock().await;
        if !is_valid_bot_id(bot_id) || !self.exists(&path) {
            return Err(StorageError::NotFound(format!("Bot {bot_id}")));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> StorageResult<Vec<Bot>> {
        self.ensure_initialized()?;

        let mut bots = Vec::new();
        for id in self.list_ids()? {
            match self.read_json::<Bot>(self.paths.bot(&id)) {
                Ok(bot) if bot.owner_id == owner_id => bots.push(bot),
                Ok(_) => {}
                Err(e) => tracing::warn!(bot_id = %id, error = %e, "Skipping unreadable bot record"),
            }
        }
        bots.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(bots)
    }

    /// Write-read-delete round trip under the data root.
    async fn health_check(&self) -> StorageResult<()> {
        self.ensure_initialized()?;

        let test_file = self
            .paths
            .root()
            .join(format!(".health_check-{}", Uuid::new_v4().simple()));
        let test_data = b"health_check_data";
        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::Io(std::io::Error::other(
                "health check data mismatch",
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::training_entry;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn test_store() -> (FileBotStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileBotStore::open(temp_dir.path()).expect("Failed to open store");
        (store, temp_dir)
    }

    fn test_bot(id: &str, owner: &str) -> Bot {
        let now = Utc::now();
        Bot {
            id: id.to_string(),
            owner_id: owner.to_string(),
            owner_phone_number: None,
            name: "Support".to_string(),
            description: None,
            welcome_message: None,
            is_public: false,
            training: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_and_get_bot() {
        let (store, _temp_dir) = test_store();
        let bot = test_bot("bot_1", "userA");
        store.create(&bot).await.unwrap();

        let loaded = store.get_by_id("bot_1").await.unwrap();
        assert_eq!(loaded, Some(bot));
        assert!(store.paths().bot("bot_1").exists());
    }

    #[tokio::test]
    async fn missing_and_invalid_ids_return_none() {
        let (store, _temp_dir) = test_store();
        assert_eq!(store.get_by_id("nope").await.unwrap(), None);
        assert_eq!(store.get_by_id("../secret").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let (store, _temp_dir) = test_store();
        let bot = test_bot("bot_1", "userA");
        store.create(&bot).await.unwrap();

        let result = store.create(&bot).await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn update_requires_existing_record() {
        let (store, _temp_dir) = test_store();
        let mut bot = test_bot("bot_1", "userA");

        let result = store.update(&bot).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        store.create(&bot).await.unwrap();
        bot.owner_id = "userB".to_string();
        store.update(&bot).await.unwrap();

        let loaded = store.get_by_id("bot_1").await.unwrap().unwrap();
        assert_eq!(loaded.owner_id, "userB");
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let (store, _temp_dir) = test_store();
        store.create(&test_bot("bot_1", "userA")).await.unwrap();

        store.delete("bot_1").await.unwrap();
        assert_eq!(store.get_by_id("bot_1").await.unwrap(), None);
        assert!(matches!(
            store.delete("bot_1").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_by_owner_filters_and_orders() {
        let (store, _temp_dir) = test_store();
        let mut older = test_bot("bot_old", "userA");
        older.created_at = Utc::now() - Duration::hours(1);
        store.create(&test_bot("bot_new", "userA")).await.unwrap();
        store.create(&older).await.unwrap();
        store.create(&test_bot("bot_other", "userB")).await.unwrap();

        let bots = store.list_by_owner("userA").await.unwrap();
        let ids: Vec<_> = bots.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["bot_old", "bot_new"]);
    }

    #[tokio::test]
    async fn uninitialized_store_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBotStore::new(StoragePaths::new(temp_dir.path()));
        assert!(matches!(
            store.get_by_id("bot_1").await,
            Err(StorageError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn health_check_works() {
        let (store, _temp_dir) = test_store();
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn modify_persists_changes_only() {
        let (store, _temp_dir) = test_store();
        store.create(&test_bot("bot_1", "userA")).await.unwrap();

        let updated = store
            .modify("bot_1", Box::new(|bot: &mut Bot| bot.name = "Renamed".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(store.get_by_id("bot_1").await.unwrap().unwrap().name, "Renamed");

        let missing = store.modify("ghost", Box::new(|_: &mut Bot| {})).await;
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_never_fail() {
        let (store, _temp_dir) = test_store();
        let store = Arc::new(store);
        store.create(&test_bot("bot_1", "userA")).await.unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut bot = test_bot("bot_1", "userA");
                    bot.name = format!("Worker {worker}");
                    let mut errors = 0;
                    for _ in 0..100 {
                        if store.update(&bot).await.is_err() {
                            errors += 1;
                        }
                    }
                    errors
                })
            })
            .collect();

        let mut errors = 0;
        for task in tasks {
            errors += task.await.unwrap();
        }
        assert_eq!(errors, 0);
        assert!(store.get_by_id("bot_1").await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_modifications_are_not_lost() {
        let (store, temp_dir) = test_store();
        let store = Arc::new(store);
        store.create(&test_bot("bot_1", "userA")).await.unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                tokio::spawn(async move {
                    for i in 0..25 {
                        let entry = training_entry(&format!("{worker}-{i}"));
                        store
                            .modify("bot_1", Box::new(move |bot: &mut Bot| bot.training.push(entry)))
                            .await
                            .unwrap();
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let stored = store.get_by_id("bot_1").await.unwrap().unwrap();
        assert_eq!(stored.training.len(), 200);

        let leftovers = fs::read_dir(temp_dir.path().join("bots")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_health_checks_succeed() {
        let (store, _temp_dir) = test_store();
        let store = Arc::new(store);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.health_check().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
    }
}
