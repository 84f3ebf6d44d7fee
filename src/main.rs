// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use emargement_server::{
    api::router,
    auth::{PasswordHasher, TokenService},
    config::{AppConfig, LogFormat},
    state::AppState,
    storage::Store,
};

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(&config.database_path())?;
    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl_seconds);
    let hasher = PasswordHasher::new(config.hash_iterations)?;

    match config.token_ttl_seconds {
        Some(ttl) => tracing::info!(ttl_seconds = ttl, "Tokens expire"),
        None => tracing::warn!("Token expiry disabled, issued tokens never expire"),
    }

    let app = router(AppState::new(store, tokens, hasher));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Emargement server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Gracefully shutting down");
}
