// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response types for the bot API. All types serialize as
//! camelCase JSON and derive `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Bots**: the owned resource, including its training entries
//! - **Requests**: create/update/training payloads
//! - **Public views**: what a deployed bot exposes to anonymous visitors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;

/// Longest accepted bot name.
pub const MAX_BOT_NAME_LEN: usize = 100;

/// Longest accepted training question or answer.
pub const MAX_TRAINING_TEXT_LEN: usize = 4_000;

// =============================================================================
// Bots
// =============================================================================

/// A chatbot owned by a single user.
///
/// `owner_phone_number` is captured at creation time and lets the owner
/// regain access when the identity provider issues them a new user id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    pub id: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_phone_number: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    /// Whether the bot is deployed and visible on the public endpoint.
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub training: Vec<TrainingEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One question/answer pair submitted while training a bot in chat.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// The subset of a bot that anonymous visitors can see.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicBot {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
}

impl From<Bot> for PublicBot {
    fn from(bot: Bot) -> Self {
        Self {
            id: bot.id,
            name: bot.name,
            description: bot.description,
            welcome_message: bot.welcome_message,
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBotRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub welcome_message: Option<String>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBotRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    pub question: String,
    pub answer: String,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Bot name is required"));
    }
    if trimmed.chars().count() > MAX_BOT_NAME_LEN {
        return Err(ValidationError::new(format!(
            "Bot name must be at most {MAX_BOT_NAME_LEN} characters"
        )));
    }
    Ok(())
}

impl CreateBotRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }
}

impl UpdateBotRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }

    /// Apply the present fields to `bot`, bumping `updated_at`.
    pub fn apply(self, bot: &mut Bot, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            bot.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            bot.description = Some(description);
        }
        if let Some(welcome_message) = self.welcome_message {
            bot.welcome_message = Some(welcome_message);
        }
        if let Some(is_public) = self.is_public {
            bot.is_public = is_public;
        }
        bot.updated_at = now;
    }
}

impl TrainingRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.question.trim().is_empty() || self.answer.trim().is_empty() {
            return Err(ValidationError::new("Question and answer are required"));
        }
        if self.question.chars().count() > MAX_TRAINING_TEXT_LEN
            || self.answer.chars().count() > MAX_TRAINING_TEXT_LEN
        {
            return Err(ValidationError::new(format!(
                "Question and answer must be at most {MAX_TRAINING_TEXT_LEN} characters"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bot() -> Bot {
        let now = Utc::now();
        Bot {
            id: "bot_1".to_string(),
            owner_id: "userA".to_string(),
            owner_phone_number: Some("+15550100".to_string()),
            name: "Helper".to_string(),
            description: None,
            welcome_message: Some("Hi!".to_string()),
            is_public: false,
            training: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn bot_serializes_camel_case() {
        let value = serde_json::to_value(sample_bot()).unwrap();
        assert_eq!(value["ownerId"], "userA");
        assert_eq!(value["ownerPhoneNumber"], "+15550100");
        assert_eq!(value["isPublic"], false);
        assert!(value.get("description").is_none());
    }

    #[test]
    fn bot_deserializes_without_optional_fields() {
        let json = r#"{
            "id": "bot_2",
            "ownerId": "userB",
            "name": "Legacy",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }"#;
        let bot: Bot = serde_json::from_str(json).unwrap();
        assert_eq!(bot.owner_phone_number, None);
        assert!(bot.training.is_empty());
        assert!(!bot.is_public);
    }

    #[test]
    fn create_request_requires_name() {
        let request = CreateBotRequest {
            name: "   ".to_string(),
            description: None,
            welcome_message: None,
        };
        assert!(request.validate().is_err());

        let request = CreateBotRequest {
            name: "x".repeat(MAX_BOT_NAME_LEN + 1),
            description: None,
            welcome_message: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn update_request_applies_present_fields_only() {
        let mut bot = sample_bot();
        let later = bot.updated_at + chrono::Duration::seconds(5);
        UpdateBotRequest {
            name: Some("  Renamed ".to_string()),
            is_public: Some(true),
            ..Default::default()
        }
        .apply(&mut bot, later);

        assert_eq!(bot.name, "Renamed");
        assert!(bot.is_public);
        assert_eq!(bot.welcome_message.as_deref(), Some("Hi!"));
        assert_eq!(bot.updated_at, later);
    }

    #[test]
    fn training_request_rejects_blank_text() {
        let request = TrainingRequest {
            question: "What are your hours?".to_string(),
            answer: " ".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn public_view_hides_owner_fields() {
        let public: PublicBot = sample_bot().into();
        let value = serde_json::to_value(public).unwrap();
        assert!(value.get("ownerId").is_none());
        assert_eq!(value["welcomeMessage"], "Hi!");
    }
}
