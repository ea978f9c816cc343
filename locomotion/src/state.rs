//! Per-character locomotion state.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// The character's exclusive locomotion mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Standing,
    Crouching,
    Proning,
    Sliding,
}

impl Stance {
    /// Crouching and proning block jump initiation.
    pub fn is_low(self) -> bool {
        matches!(self, Stance::Crouching | Stance::Proning)
    }
}

/// Capsule dimensions requested from the body on a stance change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CapsuleRequest {
    pub height: f32,
    /// Capsule center above the character's feet.
    pub center_offset: f32,
}

impl CapsuleRequest {
    pub const fn new(height: f32, center_offset: f32) -> Self {
        Self {
            height,
            center_offset,
        }
    }
}

/// Everything the controller remembers between ticks.
///
/// Created once at spawn and only ever mutated by [`crate::LocomotionController`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocomotionState {
    pub vertical_velocity: f32,
    pub stance: Stance,
    /// Capsule preset last sent to the body. Normally equal to `stance`; falling out of a
    /// crouch changes the stance without touching the capsule until the next landing.
    pub capsule: Stance,

    // --- Jumping ---
    /// 0 = on the ground, 1 = ground jump used, 2 = air jump used.
    pub jump_count: u8,
    /// A jump trigger fired and is waiting for the takeoff impulse.
    pub jump_pending: bool,
    pub is_jumping: bool,
    pub is_flipping: bool,
    pub jump_input_queued: bool,
    pub jump_input_timer: f32,

    // --- Falling ---
    pub is_falling: bool,
    pub fall_timer: f32,

    // --- Sliding ---
    pub slide_velocity: Vec3,
    pub slide_fall_timer: f32,

    // --- Misc ---
    pub is_dancing: bool,
    /// Set while a get-down / get-up prone clip plays.
    pub prone_transition: bool,
}

impl LocomotionState {
    /// Falling as far as animation is concerned: airborne flips play the falling pose too.
    /// Never set on a grounded tick.
    pub fn falling_signal(&self, grounded: bool) -> bool {
        self.is_falling || (self.is_flipping && !grounded)
    }
}

/// Ground jump plus one air jump.
pub const MAX_JUMPS: u8 = 2;
