// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, net::SocketAddr, sync::Arc};

use asque_server::{
    api::router,
    auth::{FirebaseVerifier, JwksManager, TokenVerifier, UnconfiguredVerifier},
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    rate_limit::{BucketSweeper, InMemoryRateLimitStore, RateLimitStore},
    state::AppState,
    storage::{BotStore, FileBotStore, InMemoryBotStore},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let bots = build_bot_store(&config)?;
    let verifier = build_verifier(&config)?;
    let rate_limit_store: Arc<dyn RateLimitStore> = Arc::new(InMemoryRateLimitStore::new());

    let shutdown = CancellationToken::new();
    let sweeper = BucketSweeper::new(rate_limit_store.clone())
        .with_interval(config.rate_limit_sweep_interval);
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown.clone()));

    let state = AppState::new(bots, verifier, rate_limit_store)
        .with_cookie_name(config.auth_cookie_name.clone())
        .with_trusted_proxy_headers(config.trust_proxy_headers);
    if !config.trust_proxy_headers {
        info!("Proxy headers ignored; rate limits keyed on socket peer address");
    }
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "AsQue server listening (docs at /docs)");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
    .await?;

    shutdown.cancel();
    if let Err(e) = sweeper_handle.await {
        warn!(error = %e, "Rate limit sweeper task ended abnormally");
    }
    info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_bot_store(config: &AppConfig) -> Result<Arc<dyn BotStore>, Box<dyn Error>> {
    match &config.data_dir {
        Some(dir) => {
            let store = FileBotStore::open(dir)?;
            info!(data_dir = %dir.display(), "Using file-backed bot store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATA_DIR not set; bots are kept in memory and lost on restart");
            Ok(Arc::new(InMemoryBotStore::new()))
        }
    }
}

fn build_verifier(config: &AppConfig) -> Result<Arc<dyn TokenVerifier>, Box<dyn Error>> {
    if config.insecure_dev_auth {
        #[cfg(feature = "dev")]
        {
            warn!("AUTH_INSECURE_DEV enabled: token signatures are NOT verified");
            return Ok(Arc::new(asque_server::auth::InsecureVerifier));
        }
        #[cfg(not(feature = "dev"))]
        warn!("AUTH_INSECURE_DEV ignored: built without the `dev` feature");
    }

    match &config.firebase_project_id {
        Some(project_id) => {
            let jwks = JwksManager::new(config.firebase_jwks_url.clone())?;
            info!(project_id = %project_id, "Firebase token verification enabled");
            Ok(Arc::new(FirebaseVerifier::new(project_id.clone(), jwks)))
        }
        None => {
            warn!("FIREBASE_PROJECT_ID not set; all authenticated requests will be rejected");
            Ok(Arc::new(UnconfiguredVerifier))
        }
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
