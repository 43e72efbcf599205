//! Main Entrypoint for the Voicebot API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the scene, the dispatcher, and the Gemini interpreter.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use voicebot_api::{config::Config, router::create_router, state::AppState};
use voicebot_core::{
    Dispatcher, SceneState,
    gemini::GeminiInterpreter,
    pipeline::VoicePipeline,
};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing scene...");

    // --- 3. Initialize Scene and Pipeline ---
    let scene = Arc::new(RwLock::new(SceneState::default()));
    let interpreter = Arc::new(GeminiInterpreter::new(config.gemini_config()));
    let pipeline = VoicePipeline::new(
        interpreter,
        scene,
        Dispatcher::new(config.dispatch_policy()),
    )
    .with_timeout(config.interpret_timeout);
    let app_state = Arc::new(AppState::new(pipeline));

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        model = %config.gemini_model,
        timeout = ?config.interpret_timeout,
        brightness = ?config.brightness_policy,
        bind_address = %config.bind_address,
        "3D scene loaded. Ready for voice commands. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
