//! Collaborator Interfaces
//!
//! The narrow seams between the command core and the outside world: a remote
//! interpreter that turns audio into function calls, a capture device that
//! produces encoded audio, and a renderer that draws the scene. Each seam is a
//! trait so the pipeline can be exercised without a network, a microphone, or
//! a display.

use crate::{
    adapter::InterpretationResult, audio_utils, scene::SceneState, schema::FunctionDeclaration,
};
use async_trait::async_trait;
use std::{collections::VecDeque, sync::Mutex, time::Duration};

/// Failures reported by external collaborators.
///
/// None of these are fatal; each ends as a status line shown to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("microphone access was denied")]
    PermissionDenied,
    #[error("audio capture failed: {0}")]
    Capture(String),
    #[error("interpretation service error: {0}")]
    Service(String),
    #[error("interpretation timed out after {0:?}")]
    Timeout(Duration),
}

impl CollaboratorError {
    /// The line shown to the user in a status area.
    pub fn status_line(&self) -> String {
        match self {
            CollaboratorError::PermissionDenied | CollaboratorError::Capture(_) => {
                "Status: Microphone access denied or error.".to_string()
            }
            CollaboratorError::Service(_) => {
                "Status: Error interpreting command. See logs.".to_string()
            }
            CollaboratorError::Timeout(after) => format!(
                "Status: Interpretation timed out after {}s. Try again.",
                after.as_secs()
            ),
        }
    }
}

/// An encoded audio clip ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl EncodedAudio {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The clip as standard base64, for inline request payloads.
    pub fn to_base64(&self) -> String {
        audio_utils::encode_base64(&self.data)
    }
}

/// Turns a voice clip into a function call or free text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Interprets `audio`, offering the functions described by `schema`.
    async fn interpret(
        &self,
        audio: &EncodedAudio,
        schema: &[FunctionDeclaration],
    ) -> Result<InterpretationResult, CollaboratorError>;
}

/// Opaque token identifying one recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureHandle(pub u64);

/// A recording device.
///
/// A handle is only valid until it is passed to [`AudioCapture::stop_capture`].
pub trait AudioCapture {
    fn start_capture(&mut self) -> Result<CaptureHandle, CollaboratorError>;
    fn stop_capture(&mut self, handle: CaptureHandle) -> Result<EncodedAudio, CollaboratorError>;
}

/// Draws the scene. Called on the renderer's own cadence, read-only.
pub trait SceneRenderer {
    fn render(&mut self, scene: &SceneState) -> anyhow::Result<()>;
}

/// An `Interpreter` that replays a fixed queue of results.
///
/// Useful for demos and integration tests that must not reach the network.
/// Once the queue is drained every call yields an empty text response.
#[derive(Debug, Default)]
pub struct ScriptedInterpreter {
    responses: Mutex<VecDeque<Result<InterpretationResult, CollaboratorError>>>,
}

impl ScriptedInterpreter {
    pub fn new(
        responses: impl IntoIterator<Item = Result<InterpretationResult, CollaboratorError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    async fn interpret(
        &self,
        _audio: &EncodedAudio,
        _schema: &[FunctionDeclaration],
    ) -> Result<InterpretationResult, CollaboratorError> {
        let next = match self.responses.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or_else(|| Ok(InterpretationResult::Text(String::new())))
    }
}
