//! Axum Handlers for the REST API
//!
//! This module contains the logic for reading the scene and submitting
//! commands, either as recorded audio or as a ready-made function call.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use voicebot_core::{
    collaborator::{CollaboratorError, EncodedAudio},
    pipeline::PipelineError,
};

use crate::{
    models::{CommandResponse, ErrorResponse, FunctionCallPayload, HealthResponse, SceneResponse},
    state::AppState,
};

/// MIME type assumed for uploads that do not declare one; browsers record WebM.
const DEFAULT_AUDIO_MIME_TYPE: &str = "audio/webm";

pub enum ApiError {
    BadRequest(String),
    Busy(String),
    BadGateway(String),
    GatewayTimeout(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Busy(message) => (StatusCode::CONFLICT, message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::GatewayTimeout(message) => (StatusCode::GATEWAY_TIMEOUT, message),
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let message = err.status_line();
        match err {
            PipelineError::Busy => ApiError::Busy(message),
            PipelineError::Collaborator(CollaboratorError::Timeout(_)) => {
                ApiError::GatewayTimeout(message)
            }
            PipelineError::Collaborator(
                CollaboratorError::Capture(_) | CollaboratorError::PermissionDenied,
            ) => ApiError::BadRequest(message),
            PipelineError::Collaborator(CollaboratorError::Service(_)) => {
                ApiError::BadGateway(message)
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        busy: state.pipeline.is_busy(),
    })
}

/// Get the current scene for rendering.
#[utoipa::path(
    get,
    path = "/scene",
    responses(
        (status = 200, description = "Current scene state", body = SceneResponse)
    )
)]
pub async fn get_scene(State(state): State<Arc<AppState>>) -> Json<SceneResponse> {
    let snapshot = state.scene().read().await.snapshot();
    Json(snapshot.into())
}

/// Submit a recorded voice command.
///
/// The request body is the encoded clip; its `Content-Type` is forwarded to the
/// interpreter as the audio MIME type.
#[utoipa::path(
    post,
    path = "/voice",
    request_body(content = Vec<u8>, description = "Encoded audio clip", content_type = "audio/webm"),
    responses(
        (status = 200, description = "Command interpreted and applied", body = CommandResponse),
        (status = 400, description = "Empty or unusable clip", body = ErrorResponse),
        (status = 409, description = "Another command is still being processed", body = ErrorResponse),
        (status = 502, description = "Interpretation service failed", body = ErrorResponse),
        (status = 504, description = "Interpretation service timed out", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn submit_voice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CommandResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest(
            "Status: No audio was recorded.".to_string(),
        ));
    }

    let mime_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("audio/"))
        .unwrap_or(DEFAULT_AUDIO_MIME_TYPE)
        .to_string();
    info!(%mime_type, "Voice command received");

    let report = state
        .pipeline
        .process(EncodedAudio::new(mime_type, body.to_vec()))
        .await
        .inspect_err(|e| warn!(error = %e, "Voice command failed"))?;

    let snapshot = state.scene().read().await.snapshot();
    Ok(Json(CommandResponse::new(report, snapshot)))
}

/// Apply a function call directly, without audio.
#[utoipa::path(
    post,
    path = "/commands",
    request_body = FunctionCallPayload,
    responses(
        (status = 200, description = "Command applied", body = CommandResponse)
    )
)]
#[instrument(skip_all, fields(function = %payload.name))]
pub async fn submit_command(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FunctionCallPayload>,
) -> Json<CommandResponse> {
    let report = state.pipeline.apply_function_call(payload.into()).await;
    let snapshot = state.scene().read().await.snapshot();
    Json(CommandResponse::new(report, snapshot))
}
