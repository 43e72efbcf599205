//! Voice Command Pipeline
//!
//! Sequences one recorded clip through interpretation, adaptation, and
//! dispatch. At most one clip is processed at a time; the interpreter call is
//! the only await point, and the scene is write-locked only for the
//! synchronous dispatch that follows it.

use crate::{
    adapter::{self, FunctionCall, InterpretationResult},
    collaborator::{CollaboratorError, EncodedAudio, Interpreter},
    command::Command,
    dispatcher::Dispatcher,
    outcome::Outcome,
    scene::SceneState,
    schema::{FunctionDeclaration, function_declarations},
};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Scene state shared between the pipeline and renderers.
pub type SharedScene = Arc<RwLock<SceneState>>;

/// What the user sees after a command has been handled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub status: String,
    /// What the interpreter made of the clip, if it was reached.
    pub transcript: Option<String>,
    pub outcome: Option<Outcome>,
}

impl StatusReport {
    fn from_outcome(outcome: Outcome, transcript: Option<String>) -> Self {
        Self {
            status: outcome.status_line(),
            transcript,
            outcome: Some(outcome),
        }
    }
}

/// Reasons a clip could not be turned into a scene change.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("a voice command is already being processed")]
    Busy,
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl PipelineError {
    /// The line shown to the user in a status area.
    pub fn status_line(&self) -> String {
        match self {
            PipelineError::Busy => "Status: Still processing the previous command.".to_string(),
            PipelineError::Collaborator(e) => e.status_line(),
        }
    }
}

pub struct VoicePipeline {
    interpreter: Arc<dyn Interpreter>,
    scene: SharedScene,
    dispatcher: Dispatcher,
    schema: Vec<FunctionDeclaration>,
    timeout: Option<Duration>,
    in_flight: Mutex<()>,
}

impl VoicePipeline {
    pub fn new(interpreter: Arc<dyn Interpreter>, scene: SharedScene, dispatcher: Dispatcher) -> Self {
        let policy = dispatcher.policy();
        info!(
            move_step = policy.move_step,
            bound = policy.bound,
            brightness = ?policy.brightness,
            "Voice pipeline ready"
        );
        Self {
            interpreter,
            scene,
            dispatcher,
            schema: function_declarations(),
            timeout: None,
            in_flight: Mutex::new(()),
        }
    }

    /// Bounds how long a single interpretation call may take. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scene(&self) -> SharedScene {
        self.scene.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Runs one clip through the interpreter and applies the result.
    ///
    /// Fails fast with [`PipelineError::Busy`] if another clip is in flight.
    pub async fn process(&self, audio: EncodedAudio) -> Result<StatusReport, PipelineError> {
        let _guard = self.in_flight.try_lock().map_err(|_| PipelineError::Busy)?;
        if audio.is_empty() {
            return Err(CollaboratorError::Capture("recorded clip is empty".into()).into());
        }

        info!(bytes = audio.data.len(), "Processing voice command...");
        let interpretation = self.interpreter.interpret(&audio, &self.schema);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, interpretation)
                .await
                .map_err(|_| CollaboratorError::Timeout(limit))?,
            None => interpretation.await,
        };
        let result = result.inspect_err(|e| warn!(error = %e, "Interpretation failed"))?;

        let transcript = match &result {
            InterpretationResult::FunctionCall(call) => format!("Gemini Action: {}", call.summary()),
            InterpretationResult::Text(text) => format!("Gemini Text Response: {}", text),
        };
        info!(%transcript, "Interpretation received");

        let outcome = self.dispatch(adapter::to_command(&result)).await;
        Ok(StatusReport::from_outcome(outcome, Some(transcript)))
    }

    /// Applies a function call directly, bypassing audio and interpretation.
    pub async fn apply_function_call(&self, call: FunctionCall) -> StatusReport {
        let transcript = format!("Direct Action: {}", call.summary());
        let outcome = self.dispatch(adapter::function_call_to_command(&call)).await;
        StatusReport::from_outcome(outcome, Some(transcript))
    }

    async fn dispatch(&self, command: Command) -> Outcome {
        let mut scene = self.scene.write().await;
        self.dispatcher.apply(&mut scene, command)
    }
}
