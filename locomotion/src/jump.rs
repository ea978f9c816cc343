//! Jump buffering and jump-trigger consumption.
//!
//! The controller only *arms* jumps here: it fires the trigger and marks the jump as
//! pending. The impulse itself arrives later through [`crate::LocomotionController::jump`],
//! normally called by the takeoff frame of the jump clip.

use bevy::prelude::*;

use crate::animation::AnimationTrigger;
use crate::state::{LocomotionState, MAX_JUMPS};

/// Age the buffered press, then (re)arm it if jump was pressed this tick.
///
/// A press at tick `t` stays armed while `n * dt` (ticks since the press) is below `window`.
pub fn queue(state: &mut LocomotionState, jump_pressed: bool, window: f32, dt: f32) {
    if state.jump_input_queued {
        state.jump_input_timer -= dt;
        if state.jump_input_timer <= 0.0 {
            state.jump_input_queued = false;
            state.jump_input_timer = 0.0;
        }
    }

    if jump_pressed {
        state.jump_input_queued = true;
        state.jump_input_timer = window;
    }
}

/// Consume a buffered press while standing on the ground.
pub fn try_ground_jump(state: &mut LocomotionState, triggers: &mut Vec<AnimationTrigger>) -> bool {
    if !state.jump_input_queued || state.jump_pending {
        return false;
    }
    if state.stance.is_low() {
        trace!("Ground jump held back by {:?} stance", state.stance);
        return false;
    }

    state.jump_pending = true;
    state.jump_input_queued = false;
    state.jump_count = 1;
    triggers.push(AnimationTrigger::Jump);
    debug!("Ground jump armed");
    true
}

/// Consume a buffered or fresh press while airborne. One per airborne episode.
pub fn try_air_jump(
    state: &mut LocomotionState,
    jump_pressed: bool,
    allow_double_jump: bool,
    triggers: &mut Vec<AnimationTrigger>,
) -> bool {
    let wants_jump = state.jump_input_queued || jump_pressed;
    if !allow_double_jump
        || !wants_jump
        || state.jump_pending
        || state.is_flipping
        || state.jump_count >= MAX_JUMPS
    {
        return false;
    }
    if state.stance.is_low() {
        trace!("Air jump held back by {:?} stance", state.stance);
        return false;
    }

    state.jump_pending = true;
    state.jump_input_queued = false;
    state.jump_count = MAX_JUMPS;
    triggers.push(AnimationTrigger::AirJump);
    debug!("Air jump armed");
    true
}
