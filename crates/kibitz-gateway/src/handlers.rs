// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the operator API.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use kibitz_agent::{BotStatus, MessageEntity};
use kibitz_config::{BehaviorSettings, SettingsPatch};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::server::GatewayState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub bot_controller: &'static str,
    /// Unix seconds.
    pub timestamp: i64,
    pub uptime_secs: u64,
}

/// `{"success": true}` style acknowledgment.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response body for the generate endpoints.
#[derive(Debug, Serialize)]
pub struct GeneratedResponse {
    pub success: bool,
    pub message: MessageEntity,
}

/// Response body for start/stop.
#[derive(Debug, Serialize)]
pub struct RunStateResponse {
    pub success: bool,
    /// Whether the call changed the run state.
    pub changed: bool,
    pub running: bool,
}

/// Request body for POST /api/messages/{id}/select.
#[derive(Debug, Default, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub option_index: i64,
}

/// Request body for POST /api/bot/server.
#[derive(Debug, Deserialize)]
pub struct ServerRequest {
    #[serde(default)]
    pub group_id: Option<String>,
}

/// GET /health (unauthenticated)
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        bot_controller: "available",
        timestamp: chrono::Utc::now().timestamp(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /api/status
pub async fn get_status(State(state): State<GatewayState>) -> Json<BotStatus> {
    Json(state.service.status().await)
}

/// GET /api/messages
pub async fn get_messages(State(state): State<GatewayState>) -> Json<Vec<MessageEntity>> {
    Json(state.service.pending_messages().await)
}

/// GET /api/config
pub async fn get_config(State(state): State<GatewayState>) -> Json<BehaviorSettings> {
    Json(state.service.settings().as_ref().clone())
}

/// POST /api/config
///
/// Partial update. Any invalid field rejects the whole request.
pub async fn post_config(
    State(state): State<GatewayState>,
    body: Result<Json<SettingsPatch>, JsonRejection>,
) -> ApiResult<SuccessResponse> {
    let Json(patch) = body?;
    state.service.update_settings(&patch).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/messages/{id}/select
pub async fn post_select(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Result<Json<SelectRequest>, JsonRejection>,
) -> ApiResult<SuccessResponse> {
    let Json(request) = body?;
    state.service.select(&id, request.option_index).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/messages/{id}/send
pub async fn post_send(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<SuccessResponse> {
    state.service.send_selected(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/messages/{id}/delete
pub async fn post_delete(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<SuccessResponse> {
    state.service.delete(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/generate/introduction
pub async fn post_generate_introduction(
    State(state): State<GatewayState>,
) -> ApiResult<GeneratedResponse> {
    let message = state.service.generate_introduction().await?;
    Ok(Json(GeneratedResponse {
        success: true,
        message,
    }))
}

/// POST /api/generate/test
pub async fn post_generate_test(State(state): State<GatewayState>) -> ApiResult<GeneratedResponse> {
    let message = state.service.generate_manual().await?;
    Ok(Json(GeneratedResponse {
        success: true,
        message,
    }))
}

/// POST /api/bot/server
pub async fn post_bot_server(
    State(state): State<GatewayState>,
    body: Result<Json<ServerRequest>, JsonRejection>,
) -> ApiResult<SuccessResponse> {
    let Json(request) = body?;
    let group_id = request
        .group_id
        .filter(|g| !g.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Group ID is required"))?;
    state.service.set_group(&group_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/bot/start
pub async fn post_start(State(state): State<GatewayState>) -> Json<RunStateResponse> {
    let changed = state.service.start();
    info!(changed, "operator requested start");
    Json(RunStateResponse {
        success: true,
        changed,
        running: state.service.is_running(),
    })
}

/// POST /api/bot/stop
pub async fn post_stop(State(state): State<GatewayState>) -> Json<RunStateResponse> {
    let changed = state.service.stop().await;
    info!(changed, "operator requested stop");
    Json(RunStateResponse {
        success: true,
        changed,
        running: state.service.is_running(),
    })
}
