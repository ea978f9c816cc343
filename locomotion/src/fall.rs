//! Falling detection, debounced on both time and velocity.
//!
//! A single dropped ground sample, or the first frames of a jump whose velocity has not
//! yet turned negative, must not register as a fall.

use bevy::prelude::*;

use crate::input::GroundInfo;
use crate::state::LocomotionState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallEdge {
    #[default]
    None,
    Entered,
    Exited,
}

pub fn update(
    state: &mut LocomotionState,
    ground: &GroundInfo,
    velocity_threshold: f32,
    grace_time: f32,
    dt: f32,
) -> FallEdge {
    if ground.grounded {
        let was_falling = state.is_falling;
        state.is_falling = false;
        state.fall_timer = 0.0;
        // Landing drops all in-flight jump bookkeeping.
        state.jump_input_queued = false;
        state.jump_input_timer = 0.0;
        state.jump_pending = false;
        return if was_falling {
            FallEdge::Exited
        } else {
            FallEdge::None
        };
    }

    state.fall_timer += dt;

    let currently_falling =
        state.fall_timer > grace_time && state.vertical_velocity <= velocity_threshold;

    if currently_falling && !state.is_falling && !state.is_flipping {
        state.is_falling = true;
        debug!(
            "Falling after {:.3}s airborne (vy={:.2})",
            state.fall_timer, state.vertical_velocity
        );
        return FallEdge::Entered;
    }

    FallEdge::None
}
