//! Seams to the physics side of the character.
//!
//! The controller never moves or collides anything itself: it asks a [`CharacterBody`] to
//! move by a displacement, resize its capsule and answer ceiling sweeps.

use bevy::prelude::*;

use crate::state::{CapsuleRequest, Stance};

/// Upward sphere sweep used before growing into a taller stance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CeilingSweep {
    /// Stance the character wants to grow into (Standing or Crouching).
    pub target: Stance,
    pub origin: Vec3,
    pub radius: f32,
    pub distance: f32,
}

impl CeilingSweep {
    /// Highest point the swept sphere reaches.
    pub fn top(&self) -> f32 {
        self.origin.y + self.distance + self.radius
    }
}

pub trait CeilingProbe {
    /// `true` when the sweep hits nothing.
    fn is_clear(&self, sweep: &CeilingSweep) -> bool;
}

pub trait CharacterBody: CeilingProbe {
    /// Feet position.
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    fn radius(&self) -> f32;
    fn move_by(&mut self, displacement: Vec3);
    fn set_rotation(&mut self, rotation: Quat);
    fn set_capsule(&mut self, capsule: CapsuleRequest);
}
