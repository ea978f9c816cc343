//! Vertical velocity: gravity while airborne, a sticky floor while grounded, and impulses.

use crate::input::GroundInfo;
use crate::state::LocomotionState;

/// Integrate vertical velocity for one tick.
///
/// Returns `true` when the character is in grounded contact (grounded and descending),
/// which is the tick the caller treats as a landing.
pub fn integrate(
    state: &mut LocomotionState,
    ground: &GroundInfo,
    gravity: f32,
    velocity_floor: f32,
    dt: f32,
) -> bool {
    if ground.grounded && state.vertical_velocity < 0.0 {
        // Keep a little downward velocity so ground contact persists.
        state.vertical_velocity = state.vertical_velocity.max(velocity_floor);
        true
    } else {
        state.vertical_velocity += gravity * dt;
        false
    }
}

/// Set vertical velocity outright. The only way the character leaves the ground.
pub fn apply_impulse(state: &mut LocomotionState, force: f32) {
    state.vertical_velocity = force;
    state.jump_pending = false;
    state.jump_input_queued = false;
}
