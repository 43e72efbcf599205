//! Scene State
//!
//! The in-memory model the dispatcher mutates and renderers read: where the
//! actor stands, how bright the controllable light is, and where the fixed set
//! of findable items lives. Renderers never get write access; every mutation
//! goes through [`crate::dispatcher::Dispatcher`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Half of the floor's edge length. The floor is a 10x10 plane centred on the origin.
pub const FLOOR_HALF_EXTENT: f32 = 5.0;
/// Intensity of the controllable light when it is switched on.
pub const LIGHT_ON_INTENSITY: f32 = 0.8;
/// Intensity of the controllable light when it is switched off. Dim, not dark.
pub const LIGHT_OFF_INTENSITY: f32 = 0.1;
/// Constant fill light. Not controllable, exposed so renderers can match the scene.
pub const AMBIENT_INTENSITY: f32 = 0.6;

/// Case-insensitive registry of named item positions.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRegistry {
    items: BTreeMap<String, Vec3>,
}

impl ItemRegistry {
    /// Builds a registry from arbitrary `(name, position)` pairs.
    ///
    /// Names are normalised to lowercase; a later duplicate replaces an earlier one.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec3)>,
        S: AsRef<str>,
    {
        let items = entries
            .into_iter()
            .map(|(name, position)| (normalize(name.as_ref()), position))
            .collect();
        Self { items }
    }

    /// Looks up an item by name, ignoring case and surrounding whitespace.
    pub fn get(&self, name: &str) -> Option<Vec3> {
        self.items.get(&normalize(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(name, position)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec3)> {
        self.items.iter().map(|(name, pos)| (name.as_str(), *pos))
    }
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::from_entries([
            ("keys", Vec3::new(2.0, 0.0, -1.0)),
            ("remote", Vec3::new(-2.0, 0.0, 1.0)),
            ("phone", Vec3::new(0.0, 0.0, 2.0)),
        ])
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The complete mutable state of the scene.
///
/// Fields are only writable from within this crate; outside callers get
/// read accessors and [`SceneState::snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub(crate) actor_position: Vec3,
    pub(crate) light_intensity: f32,
    items: ItemRegistry,
}

impl SceneState {
    /// Creates a scene with the actor at the origin and the light switched on.
    pub fn new(items: ItemRegistry) -> Self {
        Self {
            actor_position: Vec3::ZERO,
            light_intensity: LIGHT_ON_INTENSITY,
            items,
        }
    }

    pub fn actor_position(&self) -> Vec3 {
        self.actor_position
    }

    pub fn light_intensity(&self) -> f32 {
        self.light_intensity
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    /// Produces an owned, serializable copy for renderers outside the process.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            actor_position: self.actor_position.to_array(),
            light_intensity: self.light_intensity,
            ambient_intensity: AMBIENT_INTENSITY,
            floor_half_extent: FLOOR_HALF_EXTENT,
            items: self
                .items
                .iter()
                .map(|(name, position)| ItemMarker {
                    name: name.to_string(),
                    position: position.to_array(),
                })
                .collect(),
        }
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(ItemRegistry::default())
    }
}

/// A named marker a renderer can draw at a fixed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMarker {
    pub name: String,
    pub position: [f32; 3],
}

/// A point-in-time copy of [`SceneState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub actor_position: [f32; 3],
    pub light_intensity: f32,
    pub ambient_intensity: f32,
    pub floor_half_extent: f32,
    pub items: Vec<ItemMarker>,
}
