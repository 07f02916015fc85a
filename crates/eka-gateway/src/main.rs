//! EKA-AI Gateway binary. Config from `config/gateway.toml` and `EKA__*` env vars.

use eka_core::GatewayConfig;
use eka_gateway::{build_app, AppState};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "gateway stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::load()?;
    if config.llm_api_key.is_none() {
        tracing::warn!("no LLM API key configured; every answer will be degraded");
    }
    if config.uses_default_secret() {
        tracing::warn!("EKA__JWT_SECRET is not set; using the placeholder signing secret");
    }

    let addr = config.bind_addr();
    let state = AppState::open(config)?;
    let store = state.store.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, version = eka_core::version(), "EKA-AI gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.flush().await?;
    tracing::info!("store flushed, bye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}
