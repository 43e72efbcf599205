//! Action Dispatcher
//!
//! Applies one normalized [`Command`] to a [`SceneState`] and reports an
//! [`Outcome`]. The dispatcher performs no I/O and holds no state of its own
//! besides its policy, so the same command on the same scene always yields the
//! same result.

use crate::{
    command::{Command, Direction, LightState},
    outcome::Outcome,
    scene::{FLOOR_HALF_EXTENT, LIGHT_OFF_INTENSITY, LIGHT_ON_INTENSITY, SceneState},
};
use glam::Vec3;
use tracing::{debug, info};

/// Default distance covered by one move command.
pub const DEFAULT_MOVE_STEP: f32 = 0.5;

/// How a `brightness` argument on a light-on command is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrightnessPolicy {
    /// Brightness is accepted and ignored; "on" always uses the fixed level.
    #[default]
    Ignore,
    /// Brightness 0..=100 interpolates between the "off" and "on" levels.
    Scale,
}

/// Tunables for the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPolicy {
    pub move_step: f32,
    /// Actor `x` and `z` must stay strictly inside `(-bound, bound)`.
    pub bound: f32,
    pub light_on: f32,
    pub light_off: f32,
    pub brightness: BrightnessPolicy,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            move_step: DEFAULT_MOVE_STEP,
            bound: FLOOR_HALF_EXTENT,
            light_on: LIGHT_ON_INTENSITY,
            light_off: LIGHT_OFF_INTENSITY,
            brightness: BrightnessPolicy::Ignore,
        }
    }
}

/// Maps commands onto scene mutations.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    policy: DispatchPolicy,
}

impl Dispatcher {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Applies `command` to `scene`.
    ///
    /// The scene is only modified when the returned outcome is a success.
    pub fn apply(&self, scene: &mut SceneState, command: Command) -> Outcome {
        debug!(?command, "Applying command");
        let outcome = match command {
            Command::Move {
                direction,
                distance,
            } => self.apply_move(scene, direction, distance),
            Command::Light { state, brightness } => self.apply_light(scene, state, brightness),
            Command::Find { item } => self.apply_find(scene, &item),
            Command::Unknown { detail } => Outcome::informational("command not understood", detail),
        };
        info!(%outcome, "Command applied");
        outcome
    }

    fn apply_move(
        &self,
        scene: &mut SceneState,
        direction: Direction,
        distance: Option<f32>,
    ) -> Outcome {
        let step = distance.unwrap_or(self.policy.move_step);
        let offset = match &direction {
            Direction::Forward => Vec3::new(0.0, 0.0, -step),
            Direction::Backward => Vec3::new(0.0, 0.0, step),
            Direction::Left => Vec3::new(-step, 0.0, 0.0),
            Direction::Right => Vec3::new(step, 0.0, 0.0),
            Direction::Stop => return Outcome::success("stopped"),
            Direction::Unrecognized(raw) => {
                debug!(direction = %raw, "Unknown move direction");
                return Outcome::rejected("unknown direction");
            }
        };

        let candidate = scene.actor_position + offset;
        if !self.within_bounds(candidate) {
            return Outcome::rejected("boundary reached");
        }
        scene.actor_position = candidate;
        Outcome::success(format!("moved {}", direction))
    }

    fn within_bounds(&self, position: Vec3) -> bool {
        position.x.abs() < self.policy.bound && position.z.abs() < self.policy.bound
    }

    fn apply_light(
        &self,
        scene: &mut SceneState,
        state: LightState,
        brightness: Option<f32>,
    ) -> Outcome {
        match state {
            LightState::On => {
                scene.light_intensity = self.on_intensity(brightness);
                Outcome::success("lights turned ON")
            }
            LightState::Off => {
                scene.light_intensity = self.policy.light_off;
                Outcome::success("lights turned OFF")
            }
            LightState::Unrecognized(raw) => {
                debug!(state = %raw, "Unknown light state");
                Outcome::rejected("unknown light state")
            }
        }
    }

    fn on_intensity(&self, brightness: Option<f32>) -> f32 {
        let policy = &self.policy;
        match (policy.brightness, brightness) {
            (BrightnessPolicy::Scale, Some(level)) if level.is_finite() => {
                let fraction = (level / 100.0).clamp(0.0, 1.0);
                policy.light_off + (policy.light_on - policy.light_off) * fraction
            }
            _ => policy.light_on,
        }
    }

    fn apply_find(&self, scene: &mut SceneState, item: &str) -> Outcome {
        match scene.items().get(item) {
            Some(position) if !self.within_bounds(position) => {
                debug!(%item, ?position, "Item lies outside the floor");
                Outcome::rejected("boundary reached")
            }
            Some(position) => {
                scene.actor_position = position;
                Outcome::success(format!("found {}", item.trim().to_lowercase()))
            }
            None => Outcome::rejected("item not recognized"),
        }
    }
}
