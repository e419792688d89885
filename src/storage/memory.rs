// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local bot store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BotMutation, BotStore, StorageError, StorageResult};
use crate::models::Bot;

#[derive(Default)]
pub struct InMemoryBotStore {
    bots: RwLock<HashMap<String, Bot>>,
}

impl InMemoryBotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bots(bots: impl IntoIterator<Item = Bot>) -> Self {
        Self {
            bots: RwLock::new(bots.into_iter().map(|bot| (bot.id.clone(), bot)).collect()),
        }
    }

    /// Seed the store, replacing any bot with the same id.
    pub async fn insert(&self, bot: Bot) {
        self.bots.write().await.insert(bot.id.clone(), bot);
    }
}

#[async_trait]
impl BotStore for InMemoryBotStore {
    async fn get_by_id(&self, bot_id: &str) -> StorageResult<Option<Bot>> {
        Ok(self.bots.read().await.get(bot_id).cloned())
    }

    async fn create(&self, bot: &Bot) -> StorageResult<()> {
        let mut bots = self.bots.write().await;
        if bots.contains_key(&bot.id) {
            return Err(StorageError::AlreadyExists(format!("Bot {}", bot.id)));
        }
        bots.insert(bot.id.clone(), bot.clone());
        Ok(())
    }

    async fn update(&self, bot: &Bot) -> StorageResult<()> {
        let mut bots = self.bots.write().await;
        match bots.get_mut(&bot.id) {
            Some(existing) => {
                *existing = bot.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("Bot {}", bot.id))),
        }
    }

    async fn modify(&self, bot_id: &str, mutation: BotMutation) -> StorageResult<Bot> {
        let mut bots = self.bots.write().await;
        let bot = bots
            .get_mut(bot_id)
            .ok_or_else(|| StorageError::NotFound(format!("Bot {bot_id}")))?;
        mutation(bot);
        Ok(bot.clone())
    }

    async fn delete(&self, bot_id: &str) -> StorageResult<()> {
        self.bots
            .write()
            .await
            .remove(bot_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("Bot {bot_id}")))
    }

    async fn list_by_owner(&self, owner_id: &str) -> StorageResult<Vec<Bot>> {
        let mut bots: Vec<Bot> = self
            .bots
            .read()
            .await
            .values()
            .filter(|bot| bot.owner_id == owner_id)
            .cloned()
            .collect();
        bots.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(bots)
    }
}
