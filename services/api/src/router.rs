//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        CommandResponse, ErrorResponse, FunctionCallPayload, HealthResponse, ItemMarkerResponse,
        SceneResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted voice upload.
const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_scene,
        handlers::submit_voice,
        handlers::submit_command,
    ),
    components(
        schemas(
            SceneResponse,
            ItemMarkerResponse,
            CommandResponse,
            FunctionCallPayload,
            HealthResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Voicebot API", description = "Voice-driven control of a simple 3D scene")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/health", get(handlers::health))
        .route("/scene", get(handlers::get_scene))
        .route(
            "/voice",
            post(handlers::submit_voice).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .route("/commands", post(handlers::submit_command))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
