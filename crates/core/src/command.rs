//! Normalized commands accepted by the dispatcher.

use std::fmt;

/// A movement direction.
///
/// Values the interpreter produced but which name no known direction are kept
/// verbatim in `Unrecognized` so the dispatcher can report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
    Unrecognized(String),
}

impl Direction {
    /// Parses a direction, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "forward" => Direction::Forward,
            "backward" => Direction::Backward,
            "left" => Direction::Left,
            "right" => Direction::Right,
            "stop" => Direction::Stop,
            _ => Direction::Unrecognized(raw.to_string()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
            Direction::Stop => write!(f, "stop"),
            Direction::Unrecognized(raw) => write!(f, "{}", raw),
        }
    }
}

/// The requested state of the controllable light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightState {
    On,
    Off,
    Unrecognized(String),
}

impl LightState {
    /// Parses a light state, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "on" => LightState::On,
            "off" => LightState::Off,
            _ => LightState::Unrecognized(raw.to_string()),
        }
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightState::On => write!(f, "on"),
            LightState::Off => write!(f, "off"),
            LightState::Unrecognized(raw) => write!(f, "{}", raw),
        }
    }
}

/// A strongly-typed action for the dispatcher.
///
/// Produced only by [`crate::adapter`]; required fields are always present.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Step the actor along a floor axis. `distance` overrides the default step.
    Move {
        direction: Direction,
        distance: Option<f32>,
    },
    /// Switch the controllable light. `brightness` is on a 0-100 scale.
    Light {
        state: LightState,
        brightness: Option<f32>,
    },
    /// Teleport the actor to a registered item.
    Find { item: String },
    /// Anything the adapter could not map to an action.
    Unknown { detail: Option<String> },
}
