//! Function declarations offered to the interpreter.

use crate::adapter::{CONTROL_LIGHT, FIND_ITEM, MOVE_ROBOT};
use serde::Serialize;
use serde_json::{Value, json};

/// One callable function, in the shape function-calling APIs expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// An OpenAPI-style object schema describing the arguments.
    pub parameters: Value,
}

impl FunctionDeclaration {
    fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }

    /// Names of the arguments the declaration marks as required.
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// The three functions the adapter knows how to map.
pub fn function_declarations() -> Vec<FunctionDeclaration> {
    vec![
        FunctionDeclaration::new(
            MOVE_ROBOT,
            "Moves the robot in the specified direction. Optional distance.",
            json!({
                "type": "object",
                "properties": {
                    "direction": {
                        "type": "string",
                        "description": "The direction to move the robot (e.g., forward, backward, left, right, stop)."
                    },
                    "distance": {
                        "type": "number",
                        "description": "Optional. The distance in units the robot should move. Defaults to one step."
                    }
                },
                "required": ["direction"]
            }),
        ),
        FunctionDeclaration::new(
            CONTROL_LIGHT,
            "Controls a light in the room, turning it on or off, or setting its brightness.",
            json!({
                "type": "object",
                "properties": {
                    "state": {
                        "type": "string",
                        "description": "The desired state of the light (e.g., on, off)."
                    },
                    "brightness": {
                        "type": "number",
                        "description": "Optional. The brightness level from 0 to 100. Only applicable if state is 'on'."
                    }
                },
                "required": ["state"]
            }),
        ),
        FunctionDeclaration::new(
            FIND_ITEM,
            "Commands the robot to find a specified item in the room.",
            json!({
                "type": "object",
                "properties": {
                    "itemName": {
                        "type": "string",
                        "description": "The name of the item to find (e.g., keys, remote, phone)."
                    }
                },
                "required": ["itemName"]
            }),
        ),
    ]
}
