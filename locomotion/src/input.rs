//! Per-tick inputs supplied by external collaborators.
//! In Bevy: +X is right, +Y is up, -Z is forward.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Player intent for one tick. Fields named `*_pressed` are edges, the rest are levels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    /// x = right, y = forward, each in [-1, 1].
    pub move_axis: Vec2,
    pub run_held: bool,
    pub jump_pressed: bool,
    pub crouch_toggle_pressed: bool,
    pub crouch_held: bool,
    pub prone_toggle_pressed: bool,
    pub dance_pressed: bool,
}

impl InputSnapshot {
    /// Drop the edge flags, keeping held buttons and the stick.
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.crouch_toggle_pressed = false;
        self.prone_toggle_pressed = false;
        self.dance_pressed = false;
    }
}

/// Ground sensing result for one tick.
#[derive(Component, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundInfo {
    pub grounded: bool,
    /// Surface normal under the character; up when nothing was sampled.
    pub normal: Vec3,
}

impl Default for GroundInfo {
    fn default() -> Self {
        Self {
            grounded: false,
            normal: Vec3::Y,
        }
    }
}

impl GroundInfo {
    pub fn grounded() -> Self {
        Self {
            grounded: true,
            ..default()
        }
    }

    pub fn airborne() -> Self {
        Self::default()
    }

    pub fn on_slope(normal: Vec3) -> Self {
        Self {
            grounded: true,
            normal: normal.normalize_or(Vec3::Y),
        }
    }
}

/// Camera axes used to turn the stick into a world direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }
}

impl CameraBasis {
    pub fn from_transform(transform: &GlobalTransform) -> Self {
        Self {
            forward: *transform.forward(),
            right: *transform.right(),
        }
    }

    /// Forward projected onto the ground plane.
    pub fn flat_forward(&self) -> Vec3 {
        Vec3::new(self.forward.x, 0.0, self.forward.z)
    }

    pub fn flat_right(&self) -> Vec3 {
        Vec3::new(self.right.x, 0.0, self.right.z)
    }

    /// World-space move direction for a stick value. Zero stick gives `Vec3::ZERO`.
    pub fn move_direction(&self, move_axis: Vec2) -> Vec3 {
        (self.flat_forward() * move_axis.y + self.flat_right() * move_axis.x).normalize_or_zero()
    }
}

/// Supplies the camera axes each tick.
pub trait OrientationSource {
    fn basis(&self) -> CameraBasis;
}

impl OrientationSource for CameraBasis {
    fn basis(&self) -> CameraBasis {
        *self
    }
}
