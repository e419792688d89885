// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Anonymous view of deployed bots, used by the embeddable chat widget.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{ApiError, ApiResponse},
    models::PublicBot,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/public/bots/{bot_id}",
    params(("bot_id" = String, Path, description = "Bot identifier")),
    tag = "Public",
    responses(
        (status = 200, description = "Public bot profile", body = PublicBot),
        (status = 404, description = "No deployed bot with this id"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn get_public_bot(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
) -> Result<Json<ApiResponse<PublicBot>>, ApiError> {
    // Undeployed bots are indistinguishable from missing ones.
    match state.bots.get_by_id(&bot_id).await? {
        Some(bot) if bot.is_public => Ok(ApiResponse::ok(PublicBot::from(bot))),
        _ => Err(ApiError::not_found("Bot not found")),
    }
}
