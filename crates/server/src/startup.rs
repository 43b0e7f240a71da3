use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, RouterOptions};
use crate::state::AppState;
use service::runtime;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Build the application for a validated configuration.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    runtime::ensure_env(cfg)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    let state = AppState::from(runtime::build_backends(cfg).await?);
    Ok(routes::build_router(state, &RouterOptions::from_config(cfg), build_cors()))
}

/// Public entry: load configuration, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(
        service = "server",
        event = "listening",
        %addr,
        backend = ?cfg.backend.mode,
        auth = ?cfg.auth.provider,
        "http server ready"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
