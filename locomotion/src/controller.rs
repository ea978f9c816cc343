//! The per-character locomotion controller.
//!
//! One [`LocomotionController::tick`] per simulation frame runs, in this order:
//! 1. buffer jump input
//! 2. integrate vertical velocity and resolve landing / jump / air-jump
//! 3. slide entry, slide physics, slide cancel
//! 4. prone and crouch toggles
//! 5. horizontal velocity, combined with vertical into one displacement
//! 6. facing
//! 7. fall detection (may drop a crouch)
//! 8. animation signals
//!
//! Jump impulses and flips are *not* tick driven: an animation-event collaborator calls
//! [`LocomotionController::jump`], [`LocomotionController::begin_flip`] and friends at the
//! right frame of the clip.

use bevy::prelude::*;

use crate::animation::{AnimationSignalSet, AnimationSink, AnimationTrigger};
use crate::body::CharacterBody;
use crate::config::LocomotionConfig;
use crate::error::LocomotionError;
use crate::fall::{self, FallEdge};
use crate::input::{GroundInfo, InputSnapshot, OrientationSource};
use crate::state::{CapsuleRequest, LocomotionState, Stance};
use crate::{jump, stance, vertical};

/// What one tick did, for callers that want more than the collaborator calls.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    pub displacement: Vec3,
    pub move_direction: Vec3,
    pub landed: bool,
    pub fall_edge: FallEdge,
    pub stance: Stance,
}

pub struct LocomotionController {
    config: LocomotionConfig,
    orientation: Box<dyn OrientationSource + Send + Sync>,
    state: LocomotionState,
    signals: AnimationSignalSet,
    triggers: Vec<AnimationTrigger>,
}

pub struct LocomotionControllerBuilder {
    config: LocomotionConfig,
    orientation: Option<Box<dyn OrientationSource + Send + Sync>>,
}

impl LocomotionControllerBuilder {
    pub fn orientation(mut self, source: impl OrientationSource + Send + Sync + 'static) -> Self {
        self.orientation = Some(Box::new(source));
        self
    }

    pub fn build(self) -> Result<LocomotionController, LocomotionError> {
        let orientation = self.orientation.ok_or(LocomotionError::MissingOrientation)?;
        self.config.validate()?;
        Ok(LocomotionController {
            config: self.config,
            orientation,
            state: LocomotionState::default(),
            signals: AnimationSignalSet::default(),
            triggers: Vec::new(),
        })
    }
}

impl LocomotionController {
    pub fn builder(config: LocomotionConfig) -> LocomotionControllerBuilder {
        LocomotionControllerBuilder {
            config,
            orientation: None,
        }
    }

    pub fn new(
        config: LocomotionConfig,
        orientation: impl OrientationSource + Send + Sync + 'static,
    ) -> Result<Self, LocomotionError> {
        Self::builder(config).orientation(orientation).build()
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    pub fn stance(&self) -> Stance {
        self.state.stance
    }

    /// Capsule currently applied to the body.
    pub fn capsule(&self) -> CapsuleRequest {
        self.config.stance.capsule(self.state.capsule)
    }

    /// Signals produced by the last tick.
    pub fn signals(&self) -> &AnimationSignalSet {
        &self.signals
    }

    /// Advance the character by one frame.
    pub fn tick(
        &mut self,
        input: &InputSnapshot,
        ground: &GroundInfo,
        dt: f32,
        body: &mut impl CharacterBody,
        animator: &mut impl AnimationSink,
    ) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let config = &self.config;
        let state = &mut self.state;
        let triggers = &mut self.triggers;
        triggers.clear();

        let basis = self.orientation.basis();
        let move_dir = basis.move_direction(input.move_axis);
        let moving = input.move_axis.length() > config.movement.idle_threshold;

        // --- 1. Jump buffer ---
        jump::queue(state, input.jump_pressed, config.jump.buffer_window, dt);

        // --- 2. Vertical velocity, landing, jumps ---
        let landed = vertical::integrate(
            state,
            ground,
            config.jump.gravity,
            config.jump.grounded_velocity_floor,
            dt,
        );
        if landed {
            state.jump_count = 0;
            state.is_flipping = false;
            state.is_jumping = false;
            stance::reconcile_capsule(state, &config.stance, body, triggers);
            jump::try_ground_jump(state, triggers);
        } else if !ground.grounded {
            jump::try_air_jump(state, input.jump_pressed, config.jump.allow_double_jump, triggers);
        }

        // --- 3. Sliding ---
        stance::try_enter_slide(state, config, input, ground, move_dir, body, triggers);
        stance::update_slide(state, config, input, ground, move_dir, dt, body, triggers);

        // --- 4. Prone / crouch toggles ---
        stance::handle_toggles(state, &config.stance, input, body, triggers);

        // --- 5. Displacement ---
        let flat_forward = basis.flat_forward().normalize_or_zero();
        let moving_backward = move_dir.dot(flat_forward) < config.movement.backward_dot;
        let horizontal = if state.stance == Stance::Sliding {
            state.slide_velocity
        } else if state.prone_transition {
            Vec3::ZERO
        } else {
            move_dir * target_speed(config, state.stance, input, moving_backward)
        };
        let displacement = (horizontal + Vec3::Y * state.vertical_velocity) * dt;
        body.move_by(displacement);

        // --- 6. Facing ---
        if move_dir.length() > config.movement.idle_threshold && !state.prone_transition {
            let facing = if moving_backward { -move_dir } else { move_dir };
            // -Z forward: yaw such that (-sin, 0, -cos) points along `facing`.
            let target = Quat::from_rotation_y(f32::atan2(-facing.x, -facing.z));
            let t = (config.movement.rotation_speed * dt).clamp(0.0, 1.0);
            body.set_rotation(body.rotation().slerp(target, t));
        }

        // --- 7. Falling ---
        let fall_edge = fall::update(
            state,
            ground,
            config.fall.velocity_threshold,
            config.fall.grace_time,
            dt,
        );
        if fall_edge == FallEdge::Entered {
            triggers.push(AnimationTrigger::Fall);
            stance::uncrouch_for_fall(state);
        }

        // --- 8. Animation ---
        let falling = state.falling_signal(ground.grounded);
        if input.dance_pressed && !moving && !falling && !state.is_dancing {
            state.is_dancing = true;
            triggers.push(AnimationTrigger::Dance);
        } else if moving || falling {
            state.is_dancing = false;
        }

        let low = state.stance.is_low();
        self.signals = AnimationSignalSet {
            is_walking: moving && (!input.run_held || low),
            is_running: !low && input.run_held && moving && !moving_backward,
            is_walking_backwards: moving_backward,
            is_crouching: state.stance == Stance::Crouching,
            is_proning: state.stance == Stance::Proning,
            is_sliding: state.stance == Stance::Sliding,
            is_jumping: state.is_jumping,
            is_falling: falling,
            is_flipping: state.is_flipping,
            is_dancing: state.is_dancing,
            triggers: triggers.clone(),
        };
        animator.apply(&self.signals);

        TickReport {
            displacement,
            move_direction: move_dir,
            landed,
            fall_edge,
            stance: state.stance,
        }
    }

    // =========================================================================
    // ANIMATION EVENT ENTRY POINTS
    // =========================================================================

    /// Takeoff impulse with the configured jump force. Rejected while crouched or prone.
    pub fn jump(&mut self) -> bool {
        self.jump_with_force(self.config.jump.jump_force)
    }

    pub fn jump_with_force(&mut self, force: f32) -> bool {
        if self.state.stance.is_low() {
            trace!("Jump rejected while {:?}", self.state.stance);
            return false;
        }
        vertical::apply_impulse(&mut self.state, force);
        self.state.is_jumping = true;
        debug!("Jump impulse {force:.2}");
        true
    }

    pub fn begin_flip(&mut self) -> bool {
        if self.state.stance.is_low() {
            trace!("Flip rejected while {:?}", self.state.stance);
            return false;
        }
        self.state.is_flipping = true;
        self.state.jump_input_queued = false;
        self.jump_with_force(self.config.jump.flip_force)
    }

    pub fn end_flip(&mut self) {
        self.state.is_flipping = false;
        self.state.is_jumping = false;
    }

    /// Freeze movement and toggles while a get-down / get-up prone clip plays.
    pub fn begin_prone_transition(&mut self) {
        self.state.prone_transition = true;
    }

    pub fn end_prone_transition(&mut self) {
        self.state.prone_transition = false;
    }
}

fn target_speed(config: &LocomotionConfig, stance: Stance, input: &InputSnapshot, backward: bool) -> f32 {
    let movement = &config.movement;
    match stance {
        Stance::Sliding => 0.0,
        Stance::Proning if backward => config.stance.prone_backwards_speed,
        Stance::Proning => config.stance.prone_speed,
        Stance::Crouching if backward => config.stance.crouch_backwards_speed,
        Stance::Crouching => config.stance.crouch_speed,
        Stance::Standing if input.run_held && input.move_axis.y >= 0.0 && !backward => movement.run_speed,
        Stance::Standing if backward => movement.walk_speed * movement.backward_walk_factor,
        Stance::Standing => movement.walk_speed,
    }
}
