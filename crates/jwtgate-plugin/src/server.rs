//! HTTP surface for the plugin
//!
//! - `POST /validate` takes a [`PluginRequest`] and answers with a
//!   [`PluginResponse`]; the HTTP status mirrors `status_code`
//! - `GET /health` reports liveness and the plugin name

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::PluginConfig;
use crate::error::{PluginError, Result};
use crate::handler::{JwtPlugin, PluginRequest};

#[derive(Clone)]
struct PluginState {
    plugin: Arc<JwtPlugin>,
}

/// Router serving `/validate` and `/health`
pub fn router(plugin: Arc<JwtPlugin>) -> Router {
    Router::new()
        .route("/validate", post(validate))
        .route("/health", get(health))
        .with_state(PluginState { plugin })
}

async fn validate(
    State(state): State<PluginState>,
    Json(request): Json<PluginRequest>,
) -> impl IntoResponse {
    let response = state.plugin.handle(&request).await;
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

async fn health(State(state): State<PluginState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "plugin": state.plugin.name(),
    }))
}

/// Serve `plugin` on `listener` until ctrl-c
///
/// # Errors
///
/// Returns [`PluginError::Serve`] if the server stops with an I/O error.
pub async fn serve(plugin: Arc<JwtPlugin>, listener: TcpListener) -> Result<()> {
    axum::serve(listener, router(plugin))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(PluginError::Serve)
}

/// Initialize logging, build the plugin, and serve until ctrl-c
///
/// # Errors
///
/// Returns a [`PluginError`] if logging, the HTTP client, or the listener
/// cannot be set up, or if the server fails.
pub async fn run(config: PluginConfig) -> Result<()> {
    config
        .logging_config()
        .init()
        .map_err(PluginError::Logging)?;

    let plugin = Arc::new(JwtPlugin::from_config(&config)?);
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| PluginError::Bind {
            addr: config.listen_addr,
            source,
        })?;

    info!(
        plugin = %plugin.name(),
        addr = %config.listen_addr,
        jwks_url = plugin.jwks_url().unwrap_or("<unset>"),
        cache_ttl_secs = config.jwks_cache_ttl_secs,
        "plugin listening"
    );

    serve(plugin, listener).await?;
    info!("plugin stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    info!("shutdown requested");
}
