// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Identity,
    models::{Bot, CreateBotRequest, PublicBot, TrainingEntry, TrainingRequest, UpdateBotRequest},
    pipeline::Pipeline,
    state::AppState,
};

pub mod auth;
pub mod bots;
pub mod health;
pub mod public;

pub fn router(state: AppState) -> Router {
    let limits = &state.rate_limits;

    let session_routes: Router<AppState> = Pipeline::new()
        .rate_limit(limits.auth.clone())
        .authenticate(state.browser_authenticator())
        .apply(Router::new().route("/v1/auth/me", get(auth::get_current_identity)));

    let collection_routes = Pipeline::new()
        .rate_limit(limits.api.clone())
        .authenticate(state.authenticator())
        .apply(Router::new().route("/v1/bots", get(bots::list_bots).post(bots::create_bot)));

    let bot_routes = Pipeline::new()
        .rate_limit(limits.api.clone())
        .authenticate(state.authenticator())
        .require_ownership(state.ownership())
        .apply(Router::new().route(
            "/v1/bots/{bot_id}",
            get(bots::get_bot).put(bots::update_bot).delete(bots::delete_bot),
        ));

    let training_routes = Pipeline::new()
        .rate_limit(limits.training.clone())
        .authenticate(state.authenticator())
        .require_ownership(state.ownership())
        .apply(Router::new().route("/v1/bots/{bot_id}/training", post(bots::add_training)));

    let public_routes = Pipeline::new()
        .rate_limit(limits.chat.clone())
        .apply(Router::new().route("/v1/public/bots/{bot_id}", get(public::get_public_bot)));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(session_routes)
        .merge(collection_routes)
        .merge(bot_routes)
        .merge(training_routes)
        .merge(public_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Last added runs first: CORS -> request id -> trace -> propagate id.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        auth::get_current_identity,
        bots::list_bots,
        bots::create_bot,
        bots::get_bot,
        bots::update_bot,
        bots::delete_bot,
        bots::add_training,
        public::get_public_bot
    ),
    components(
        schemas(
            Bot,
            TrainingEntry,
            PublicBot,
            Identity,
            CreateBotRequest,
            UpdateBotRequest,
            TrainingRequest,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Caller identity"),
        (name = "Bots", description = "Bot management and training"),
        (name = "Public", description = "Deployed bot profiles")
    )
)]
struct ApiDoc;
