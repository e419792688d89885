// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bot management endpoints.
//!
//! Routes under `/v1/bots/{bot_id}` sit behind the ownership stage, so the
//! handlers here never re-check who owns the bot.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::{ApiError, ApiResponse},
    models::{Bot, CreateBotRequest, TrainingEntry, TrainingRequest, UpdateBotRequest},
    state::AppState,
    storage::BotMutation,
};

async fn load_bot(state: &AppState, bot_id: &str) -> Result<Bot, ApiError> {
    state
        .bots
        .get_by_id(bot_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bot {bot_id} not found")))
}

async fn modify_bot(
    state: &AppState,
    bot_id: &str,
    mutation: BotMutation,
) -> Result<Bot, ApiError> {
    Ok(state.bots.modify(bot_id, mutation).await?)
}

#[utoipa::path(
    get,
    path = "/v1/bots",
    tag = "Bots",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Bots owned by the caller", body = [Bot]),
        (status = 401, description = "Missing or invalid credential"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn list_bots(
    State(state): State<AppState>,
    Auth(identity): Auth,
) -> Result<Json<ApiResponse<Vec<Bot>>>, ApiError> {
    let bots = state.bots.list_by_owner(&identity.subject_id).await?;
    Ok(ApiResponse::ok(bots))
}

#[utoipa::path(
    post,
    path = "/v1/bots",
    request_body = CreateBotRequest,
    tag = "Bots",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Bot created", body = Bot),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Missing or invalid credential")
    )
)]
pub async fn create_bot(
    State(state): State<AppState>,
    Auth(identity): Auth,
    payload: Result<Json<CreateBotRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Bot>>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let now = Utc::now();
    let bot = Bot {
        id: Uuid::new_v4().simple().to_string(),
        owner_id: identity.subject_id,
        owner_phone_number: identity.phone_number,
        name: request.name.trim().to_string(),
        description: request.description,
        welcome_message: request.welcome_message,
        is_public: false,
        training: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    state.bots.create(&bot).await?;

    tracing::info!(bot_id = %bot.id, owner_id = %bot.owner_id, "Bot created");
    Ok((StatusCode::CREATED, ApiResponse::ok(bot)))
}

#[utoipa::path(
    get,
    path = "/v1/bots/{bot_id}",
    params(("bot_id" = String, Path, description = "Bot identifier")),
    tag = "Bots",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The bot", body = Bot),
        (status = 403, description = "Caller does not own the bot")
    )
)]
pub async fn get_bot(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
) -> Result<Json<ApiResponse<Bot>>, ApiError> {
    Ok(ApiResponse::ok(load_bot(&state, &bot_id).await?))
}

#[utoipa::path(
    put,
    path = "/v1/bots/{bot_id}",
    params(("bot_id" = String, Path, description = "Bot identifier")),
    request_body = UpdateBotRequest,
    tag = "Bots",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated bot", body = Bot),
        (status = 400, description = "Invalid request body"),
        (status = 403, description = "Caller does not own the bot")
    )
)]
pub async fn update_bot(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    payload: Result<Json<UpdateBotRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Bot>>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let now = Utc::now();
    let bot = modify_bot(
        &state,
        &bot_id,
        Box::new(move |bot: &mut Bot| request.apply(bot, now)),
    )
    .await?;

    Ok(ApiResponse::ok(bot))
}

#[utoipa::path(
    delete,
    path = "/v1/bots/{bot_id}",
    params(("bot_id" = String, Path, description = "Bot identifier")),
    tag = "Bots",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Bot deleted"),
        (status = 403, description = "Caller does not own the bot")
    )
)]
pub async fn delete_bot(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.bots.delete(&bot_id).await?;
    tracing::info!(bot_id = %bot_id, "Bot deleted");
    Ok(ApiResponse::empty())
}

#[utoipa::path(
    post,
    path = "/v1/bots/{bot_id}/training",
    params(("bot_id" = String, Path, description = "Bot identifier")),
    request_body = TrainingRequest,
    tag = "Bots",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Training entry appended", body = TrainingEntry),
        (status = 400, description = "Invalid request body"),
        (status = 403, description = "Caller does not own the bot"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn add_training(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    payload: Result<Json<TrainingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TrainingEntry>>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let now = Utc::now();
    let entry = TrainingEntry {
        id: Uuid::new_v4().to_string(),
        question: request.question.trim().to_string(),
        answer: request.answer.trim().to_string(),
        created_at: now,
    };
    let appended = entry.clone();
    modify_bot(
        &state,
        &bot_id,
        Box::new(move |bot: &mut Bot| {
            bot.training.push(appended);
            bot.updated_at = now;
        }),
    )
    .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(entry)))
}
