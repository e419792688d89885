// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for bot-scoped routes.
//!
//! A caller owns a bot when their subject id equals the recorded `ownerId`,
//! or when their verified phone number equals the recorded
//! `ownerPhoneNumber`. The second case happens after the identity provider
//! reissues a user id; the resolver then rewrites `ownerId` so later checks
//! hit the direct path.
//!
//! Every failure denies: missing bot, storage error, or a failed write-back.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::{AuthError, Identity};
use crate::error::ApiError;
use crate::models::Bot;
use crate::storage::{BotStore, OwnedResource, OwnerMatch};

/// Route parameter naming the bot.
pub const BOT_ID_PARAM: &str = "bot_id";

/// 403 body message.
pub const ACCESS_DENIED: &str = "Access denied: You do not own this bot";

/// 400 body message when the route carries no bot id.
pub const BOT_ID_REQUIRED: &str = "Bot ID is required";

#[derive(Clone)]
pub struct OwnershipResolver {
    store: Arc<dyn BotStore>,
}

impl OwnershipResolver {
    pub fn new(store: Arc<dyn BotStore>) -> Self {
        Self { store }
    }

    /// Whether `identity` owns `bot_id`, healing a stale `ownerId` on a phone
    /// match.
    ///
    /// The write-back re-checks the match inside the store's atomic update, so
    /// concurrent fallbacks for the same caller converge on one owner.
    pub async fn verify_ownership(&self, bot_id: &str, identity: &Identity) -> bool {
        let bot = match self.store.get_by_id(bot_id).await {
            Ok(Some(bot)) => bot,
            Ok(None) => {
                debug!(bot_id, "Ownership check on missing bot");
                return false;
            }
            Err(e) => {
                warn!(bot_id, error = %e, "Ownership lookup failed");
                return false;
            }
        };

        match bot.match_owner(identity) {
            OwnerMatch::Direct => true,
            OwnerMatch::Denied => false,
            OwnerMatch::PhoneFallback => {
                self.migrate_owner(bot_id, &bot.owner_id, identity).await
            }
        }
    }

    async fn migrate_owner(
        &self,
        bot_id: &str,
        previous_owner: &str,
        identity: &Identity,
    ) -> bool {
        let claimant = identity.clone();
        let migration = Box::new(move |bot: &mut Bot| {
            if bot.match_owner(&claimant) == OwnerMatch::PhoneFallback {
                bot.owner_id = claimant.subject_id;
                bot.updated_at = Utc::now();
            }
        });

        match self.store.modify(bot_id, migration).await {
            Ok(bot) if bot.owner_id == identity.subject_id => {
                info!(
                    bot_id,
                    previous_owner,
                    new_owner = %identity.subject_id,
                    "Bot owner migrated via phone number match"
                );
                true
            }
            Ok(_) => {
                debug!(bot_id, "Bot owner changed before migration");
                false
            }
            Err(e) => {
                error!(bot_id, error = %e, "Failed to persist owner migration");
                false
            }
        }
    }
}

/// Deny requests for bots the authenticated caller does not own.
///
/// Must run after `require_auth`.
pub async fn require_ownership(
    State(resolver): State<OwnershipResolver>,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    request: Request,
    next: Next,
) -> Response {
    let bot_id = params
        .ok()
        .and_then(|Path(mut params)| params.remove(BOT_ID_PARAM))
        .filter(|id| !id.trim().is_empty());
    let Some(bot_id) = bot_id else {
        return ApiError::bad_request(BOT_ID_REQUIRED).into_response();
    };

    let Some(identity) = request.extensions().get::<Identity>() else {
        warn!(bot_id = %bot_id, "Ownership stage reached without an identity");
        return AuthError::MissingCredential.into_response();
    };

    if !resolver.verify_ownership(&bot_id, identity).await {
        debug!(bot_id = %bot_id, subject_id = %identity.subject_id, "Ownership denied");
        return ApiError::forbidden(ACCESS_DENIED).into_response();
    }

    next.run(request).await
}
