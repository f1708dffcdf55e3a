// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use kibitz_agent::BotService;
use kibitz_config::model::GatewayConfig;
use kibitz_core::KibitzError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub service: Arc<BotService>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(service: Arc<BotService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token for the `/api` routes (None = auth disabled).
    pub bearer_token: Option<String>,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            bearer_token: config.bearer_token.clone(),
        }
    }
}

/// Builds the router: `/health` is public, everything under `/api` sits
/// behind the bearer middleware when a token is configured.
pub fn build_router(state: GatewayState, bearer_token: Option<String>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let mut api_routes = Router::new()
        .route("/api/status", get(handlers::get_status))
        .route("/api/messages", get(handlers::get_messages))
        .route(
            "/api/config",
            get(handlers::get_config).post(handlers::post_config),
        )
        .route("/api/messages/{id}/select", post(handlers::post_select))
        .route("/api/messages/{id}/send", post(handlers::post_send))
        .route("/api/messages/{id}/delete", post(handlers::post_delete))
        .route(
            "/api/generate/introduction",
            post(handlers::post_generate_introduction),
        )
        .route("/api/generate/test", post(handlers::post_generate_test))
        .route("/api/bot/server", post(handlers::post_bot_server))
        .route("/api/bot/start", post(handlers::post_start))
        .route("/api/bot/stop", post(handlers::post_stop));

    if let Some(bearer_token) = bearer_token {
        api_routes = api_routes.route_layer(axum_middleware::from_fn_with_state(
            AuthConfig { bearer_token },
            auth_middleware,
        ));
    } else {
        tracing::warn!("gateway bearer token not set, operator API is unauthenticated");
    }

    Router::new()
        .merge(public_routes)
        .merge(api_routes.with_state(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `host:port` and serves until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), KibitzError> {
    let app = build_router(state, config.bearer_token.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| KibitzError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| KibitzError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
