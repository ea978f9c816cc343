//! Stance machine: crouch / prone toggles, sliding, and ceiling clearance.
//!
//! Sliding is evaluated before the toggles every tick and takes precedence over them while
//! active. Every stance change goes through [`set_stance`] so the body always receives the
//! matching capsule preset.

use bevy::prelude::*;

use crate::animation::AnimationTrigger;
use crate::body::{CeilingSweep, CharacterBody};
use crate::config::{LocomotionConfig, StanceConfig};
use crate::input::{GroundInfo, InputSnapshot};
use crate::state::{LocomotionState, Stance};

// =============================================================================
// CEILING CLEARANCE
// =============================================================================

/// Sweep from the top of the lower stance up to the top of `target`, minus the margin.
pub fn ceiling_sweep(config: &StanceConfig, position: Vec3, body_radius: f32, target: Stance) -> CeilingSweep {
    let (lower, upper) = match target {
        Stance::Crouching => (config.proning.height, config.crouching.height),
        _ => (config.crouching.height, config.standing.height),
    };
    CeilingSweep {
        target,
        origin: position + Vec3::Y * lower,
        radius: body_radius * config.probe_radius_factor,
        distance: (upper - lower - config.clearance_margin).max(0.0),
    }
}

pub fn can_stand_up(config: &StanceConfig, body: &impl CharacterBody) -> bool {
    body.is_clear(&ceiling_sweep(config, body.position(), body.radius(), Stance::Standing))
}

pub fn can_crouch_up(config: &StanceConfig, body: &impl CharacterBody) -> bool {
    body.is_clear(&ceiling_sweep(config, body.position(), body.radius(), Stance::Crouching))
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// Switch stance and send the matching capsule to the body.
pub fn set_stance(
    state: &mut LocomotionState,
    config: &StanceConfig,
    stance: Stance,
    body: &mut impl CharacterBody,
) {
    if state.stance != stance {
        debug!("Stance {:?} -> {:?}", state.stance, stance);
    }
    state.stance = stance;
    if state.capsule != stance {
        state.capsule = stance;
        body.set_capsule(config.capsule(stance));
    }
}

/// Start a slide if running, moving, standing and the crouch button went down this tick.
#[allow(clippy::too_many_arguments)]
pub fn try_enter_slide(
    state: &mut LocomotionState,
    config: &LocomotionConfig,
    input: &InputSnapshot,
    ground: &GroundInfo,
    move_dir: Vec3,
    body: &mut impl CharacterBody,
    triggers: &mut Vec<AnimationTrigger>,
) -> bool {
    let moving = input.move_axis.length() > config.movement.idle_threshold;
    let footing = ground.grounded || state.vertical_velocity < 0.0;
    if !(input.crouch_toggle_pressed
        && input.run_held
        && moving
        && footing
        && state.stance == Stance::Standing)
    {
        return false;
    }

    state.slide_velocity = move_dir * config.movement.run_speed;
    state.slide_fall_timer = 0.0;
    set_stance(state, &config.stance, Stance::Sliding, body);
    triggers.push(AnimationTrigger::Slide);
    true
}

/// Slide physics for one tick. Returns `true` if the slide ended this tick.
#[allow(clippy::too_many_arguments)]
pub fn update_slide(
    state: &mut LocomotionState,
    config: &LocomotionConfig,
    input: &InputSnapshot,
    ground: &GroundInfo,
    move_dir: Vec3,
    dt: f32,
    body: &mut impl CharacterBody,
    triggers: &mut Vec<AnimationTrigger>,
) -> bool {
    if state.stance != Stance::Sliding {
        return false;
    }
    let slide = &config.slide;

    // Downhill direction along the ground plane; zero on flat ground.
    let normal = ground.normal.normalize_or(Vec3::Y);
    let slope_dir = Vec3::NEG_Y.reject_from(normal).normalize_or_zero();
    state.slide_velocity += slope_dir * slide.slope_boost * dt;
    state.slide_velocity += move_dir * slide.flat_boost * dt;
    let decay = (slide.friction * dt).clamp(0.0, 1.0);
    state.slide_velocity = state.slide_velocity.lerp(Vec3::ZERO, decay);

    if ground.grounded {
        state.slide_fall_timer = 0.0;
    } else {
        state.slide_fall_timer += dt;
    }

    let released = !input.crouch_held;
    let too_slow = state.slide_velocity.length() < slide.min_speed;
    let fell_off = !ground.grounded && state.slide_fall_timer > slide.fall_grace_time;
    if !(released || too_slow || fell_off) {
        return false;
    }

    debug!(
        "Slide cancelled (released={released}, too_slow={too_slow}, fell_off={fell_off}, speed={:.2})",
        state.slide_velocity.length()
    );
    cancel_slide(state, &config.stance, body, triggers);
    true
}

/// Resolve the post-slide stance: Standing, else Crouching, else Proning.
pub fn cancel_slide(
    state: &mut LocomotionState,
    config: &StanceConfig,
    body: &mut impl CharacterBody,
    triggers: &mut Vec<AnimationTrigger>,
) {
    state.slide_velocity = Vec3::ZERO;
    state.slide_fall_timer = 0.0;

    let stand_allowed = can_stand_up(config, body);
    let crouch_allowed = can_crouch_up(config, body);

    if stand_allowed && crouch_allowed {
        set_stance(state, config, Stance::Standing, body);
    } else if crouch_allowed {
        set_stance(state, config, Stance::Crouching, body);
        triggers.push(AnimationTrigger::Crouch);
    } else {
        set_stance(state, config, Stance::Proning, body);
        triggers.push(AnimationTrigger::Prone);
    }
}

/// Prone then crouch toggles. Blocked ceiling sweeps reject the toggle silently.
pub fn handle_toggles(
    state: &mut LocomotionState,
    config: &StanceConfig,
    input: &InputSnapshot,
    body: &mut impl CharacterBody,
    triggers: &mut Vec<AnimationTrigger>,
) {
    if state.prone_transition || state.stance == Stance::Sliding {
        return;
    }

    if input.prone_toggle_pressed {
        match state.stance {
            Stance::Crouching => {
                set_stance(state, config, Stance::Proning, body);
                triggers.push(AnimationTrigger::Prone);
            }
            Stance::Proning => {
                if can_crouch_up(config, body) {
                    set_stance(state, config, Stance::Crouching, body);
                    triggers.push(AnimationTrigger::ProneExit);
                } else {
                    trace!("Prone exit blocked by ceiling");
                }
            }
            _ => {}
        }
    }

    if input.crouch_toggle_pressed && !input.run_held {
        match state.stance {
            Stance::Standing => {
                set_stance(state, config, Stance::Crouching, body);
                triggers.push(AnimationTrigger::Crouch);
            }
            Stance::Crouching => {
                if can_stand_up(config, body) {
                    set_stance(state, config, Stance::Standing, body);
                } else {
                    trace!("Stand up blocked by ceiling");
                }
            }
            _ => {}
        }
    }
}

/// Falling drops a crouch back to standing for animation; the capsule waits for landing.
pub fn uncrouch_for_fall(state: &mut LocomotionState) {
    if state.stance == Stance::Crouching {
        debug!("Fall cancelled crouch");
        state.stance = Stance::Standing;
    }
}

/// On landing, bring the capsule back in line with the stance.
///
/// If there is no room to stand, the character drops back into its crouch instead.
pub fn reconcile_capsule(
    state: &mut LocomotionState,
    config: &StanceConfig,
    body: &mut impl CharacterBody,
    triggers: &mut Vec<AnimationTrigger>,
) {
    if state.capsule == state.stance {
        return;
    }
    if state.stance == Stance::Standing && !can_stand_up(config, body) {
        debug!("Landed under a ceiling, back to {:?}", state.capsule);
        state.stance = state.capsule;
        if state.stance == Stance::Crouching {
            triggers.push(AnimationTrigger::Crouch);
        }
        return;
    }
    state.capsule = state.stance;
    body.set_capsule(config.capsule(state.stance));
}
