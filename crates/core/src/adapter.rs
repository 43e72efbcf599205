//! Command Adapter
//!
//! The single boundary where the interpreter's loosely-shaped output becomes a
//! typed [`Command`]. Nothing past this point sees untyped JSON.
//!
//! The mapping is total: every [`InterpretationResult`] produces a command,
//! with anything unmappable ending up as [`Command::Unknown`].

use crate::command::{Command, Direction, LightState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// External name of the movement function.
pub const MOVE_ROBOT: &str = "moveRobot";
/// External name of the light function.
pub const CONTROL_LIGHT: &str = "controlLight";
/// External name of the item-finding function.
pub const FIND_ITEM: &str = "findItem";

/// A structured function call returned by the interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        let args = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            args,
        }
    }

    /// Renders the call as `name{args}` for transcripts.
    pub fn summary(&self) -> String {
        format!("{}{}", self.name, Value::Object(self.args.clone()))
    }
}

/// What the interpreter made of a voice clip.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpretationResult {
    FunctionCall(FunctionCall),
    Text(String),
}

/// Converts an interpreter result into a dispatcher command.
pub fn to_command(result: &InterpretationResult) -> Command {
    match result {
        InterpretationResult::FunctionCall(call) => function_call_to_command(call),
        InterpretationResult::Text(text) => {
            let text = text.trim();
            Command::Unknown {
                detail: (!text.is_empty()).then(|| text.to_string()),
            }
        }
    }
}

/// Converts a single function call into a dispatcher command.
pub fn function_call_to_command(call: &FunctionCall) -> Command {
    let args = &call.args;
    match call.name.as_str() {
        MOVE_ROBOT => match required_str(args, "direction") {
            Some(direction) => Command::Move {
                direction: Direction::parse(direction),
                distance: optional_number(args, "distance")
                    .and_then(|d| positive_distance(&call.name, d)),
            },
            None => missing_field(&call.name),
        },
        CONTROL_LIGHT => match required_str(args, "state") {
            Some(state) => Command::Light {
                state: LightState::parse(state),
                brightness: optional_number(args, "brightness").map(|b| b.clamp(0.0, 100.0)),
            },
            None => missing_field(&call.name),
        },
        FIND_ITEM => match required_str(args, "itemName") {
            Some(item) => Command::Find {
                item: item.to_string(),
            },
            None => missing_field(&call.name),
        },
        other => {
            warn!(function = %other, "Unknown function call received");
            Command::Unknown {
                detail: Some(format!("unknown function {}", other)),
            }
        }
    }
}

fn missing_field(function: &str) -> Command {
    warn!(%function, "Function call missing required field");
    Command::Unknown {
        detail: Some(format!("{} missing required field", function)),
    }
}

fn required_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Reads an optional numeric argument, accepting numbers and numeric strings.
fn optional_number(args: &Map<String, Value>, key: &str) -> Option<f32> {
    let value = args.get(key)?;
    let number = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => Some(n as f32),
        _ => {
            warn!(%key, %value, "Discarding non-numeric argument");
            None
        }
    }
}

fn positive_distance(function: &str, distance: f32) -> Option<f32> {
    if distance > 0.0 {
        Some(distance)
    } else {
        warn!(%function, distance, "Discarding non-positive distance");
        None
    }
}
