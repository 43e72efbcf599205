//! API Models
//!
//! Request and response bodies of the HTTP surface, with `utoipa` schemas for
//! the generated OpenAPI document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use voicebot_core::{
    FunctionCall, Outcome, SceneSnapshot,
    pipeline::StatusReport,
    scene::ItemMarker,
};

/// A named marker drawn at a fixed position.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ItemMarkerResponse {
    #[schema(example = "keys")]
    pub name: String,
    pub position: [f32; 3],
}

/// Everything a renderer needs to draw the current frame.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct SceneResponse {
    pub actor_position: [f32; 3],
    pub light_intensity: f32,
    pub ambient_intensity: f32,
    pub floor_half_extent: f32,
    pub items: Vec<ItemMarkerResponse>,
}

impl From<SceneSnapshot> for SceneResponse {
    fn from(snapshot: SceneSnapshot) -> Self {
        Self {
            actor_position: snapshot.actor_position,
            light_intensity: snapshot.light_intensity,
            ambient_intensity: snapshot.ambient_intensity,
            floor_half_extent: snapshot.floor_half_extent,
            items: snapshot
                .items
                .into_iter()
                .map(|ItemMarker { name, position }| ItemMarkerResponse { name, position })
                .collect(),
        }
    }
}

/// A function call submitted directly, without audio.
#[derive(Deserialize, ToSchema, Debug)]
pub struct FunctionCallPayload {
    #[schema(example = "moveRobot")]
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub args: Map<String, Value>,
}

impl From<FunctionCallPayload> for FunctionCall {
    fn from(payload: FunctionCallPayload) -> Self {
        FunctionCall {
            name: payload.name,
            args: payload.args,
        }
    }
}

/// The status of a handled command together with the resulting scene.
#[derive(Serialize, ToSchema, Debug)]
pub struct CommandResponse {
    #[schema(example = "Status: moved left")]
    pub status: String,
    pub transcript: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub outcome: Option<Outcome>,
    pub scene: SceneResponse,
}

impl CommandResponse {
    pub fn new(report: StatusReport, scene: SceneSnapshot) -> Self {
        Self {
            status: report.status,
            transcript: report.transcript,
            outcome: report.outcome,
            scene: scene.into(),
        }
    }
}

/// Liveness probe body.
#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    /// Whether a voice command is currently being interpreted.
    pub busy: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
