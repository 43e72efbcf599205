//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the voice pipeline
//! and, through it, the scene every handler reads or mutates.

use std::sync::Arc;
use voicebot_core::pipeline::{SharedScene, VoicePipeline};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<VoicePipeline>,
}

impl AppState {
    pub fn new(pipeline: VoicePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn scene(&self) -> SharedScene {
        self.pipeline.scene()
    }
}
