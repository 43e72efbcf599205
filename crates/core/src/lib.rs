pub mod adapter;
pub mod audio_utils;
pub mod collaborator;
pub mod command;
pub mod dispatcher;
pub mod gemini;
pub mod outcome;
pub mod pipeline;
pub mod scene;
pub mod schema;

pub use adapter::{FunctionCall, InterpretationResult};
pub use command::{Command, Direction, LightState};
pub use dispatcher::{BrightnessPolicy, DispatchPolicy, Dispatcher};
pub use outcome::Outcome;
pub use scene::{SceneSnapshot, SceneState};
