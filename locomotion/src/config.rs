//! Locomotion tuning.
//!
//! Every value has a default that matches the shipped character; RON files only need to
//! list what they override (all structs are `#[serde(default)]`).

use std::fmt;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::state::{CapsuleRequest, Stance};

// =============================================================================
// TUNING CONSTANTS
// =============================================================================

pub mod tuning {
    pub const WALK_SPEED: f32 = 2.0;
    pub const RUN_SPEED: f32 = 5.0;
    /// Walking backwards is a little slower than walking forwards.
    pub const BACKWARD_WALK_FACTOR: f32 = 0.85;
    pub const ROTATION_SPEED: f32 = 4.0;
    /// Stick magnitude below which the character counts as idle.
    pub const IDLE_THRESHOLD: f32 = 0.1;
    /// Dot(move, camera forward) below this means "walking backwards".
    pub const BACKWARD_DOT: f32 = -0.1;

    pub const GRAVITY: f32 = -20.0;
    pub const JUMP_FORCE: f32 = 10.0;
    pub const FLIP_FORCE: f32 = 8.0;
    pub const JUMP_BUFFER_WINDOW: f32 = 0.05;
    /// Residual downward velocity kept while grounded so ground contact stays sticky.
    pub const GROUNDED_VELOCITY_FLOOR: f32 = -2.0;

    pub const FALLING_VELOCITY_THRESHOLD: f32 = -1.0;
    pub const FALL_GRACE_TIME: f32 = 0.05;

    pub const STAND_HEIGHT: f32 = 1.67;
    pub const STAND_CENTER: f32 = 0.9;
    pub const CROUCH_HEIGHT: f32 = 1.0;
    pub const CROUCH_CENTER: f32 = 0.57;
    pub const PRONE_HEIGHT: f32 = 0.4;
    pub const PRONE_CENTER: f32 = 0.2;
    pub const SLIDE_HEIGHT: f32 = 0.2;
    pub const SLIDE_CENTER: f32 = 0.4;
    pub const CROUCH_SPEED: f32 = 1.67;
    pub const CROUCH_BACKWARDS_SPEED: f32 = 1.5;
    pub const PRONE_SPEED: f32 = 1.25;
    pub const PRONE_BACKWARDS_SPEED: f32 = 1.0;
    pub const CEILING_CLEARANCE_MARGIN: f32 = 0.15;
    pub const PROBE_RADIUS_FACTOR: f32 = 0.95;
    pub const BODY_RADIUS: f32 = 0.3;

    pub const SLIDE_SLOPE_BOOST: f32 = 15.0;
    pub const FLAT_SLIDE_BOOST: f32 = 2.5;
    pub const SLIDE_FRICTION: f32 = 1.0;
    pub const MIN_SLIDE_SPEED: f32 = 3.5;
    pub const SLIDE_FALL_GRACE_TIME: f32 = 1.0;
}

// =============================================================================
// CONFIG TYPES
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub movement: MovementConfig,
    pub jump: JumpConfig,
    pub fall: FallConfig,
    pub stance: StanceConfig,
    pub slide: SlideConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub backward_walk_factor: f32,
    pub rotation_speed: f32,
    pub idle_threshold: f32,
    pub backward_dot: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: tuning::WALK_SPEED,
            run_speed: tuning::RUN_SPEED,
            backward_walk_factor: tuning::BACKWARD_WALK_FACTOR,
            rotation_speed: tuning::ROTATION_SPEED,
            idle_threshold: tuning::IDLE_THRESHOLD,
            backward_dot: tuning::BACKWARD_DOT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Gravity in m/s^2 (negative Y).
    pub gravity: f32,
    pub jump_force: f32,
    pub flip_force: f32,
    pub allow_double_jump: bool,
    /// How long (seconds) an early jump press stays armed.
    pub buffer_window: f32,
    pub grounded_velocity_floor: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            gravity: tuning::GRAVITY,
            jump_force: tuning::JUMP_FORCE,
            flip_force: tuning::FLIP_FORCE,
            allow_double_jump: true,
            buffer_window: tuning::JUMP_BUFFER_WINDOW,
            grounded_velocity_floor: tuning::GROUNDED_VELOCITY_FLOOR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallConfig {
    pub velocity_threshold: f32,
    pub grace_time: f32,
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: tuning::FALLING_VELOCITY_THRESHOLD,
            grace_time: tuning::FALL_GRACE_TIME,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceConfig {
    pub standing: CapsuleRequest,
    pub crouching: CapsuleRequest,
    pub proning: CapsuleRequest,
    pub sliding: CapsuleRequest,
    pub crouch_speed: f32,
    pub crouch_backwards_speed: f32,
    pub prone_speed: f32,
    pub prone_backwards_speed: f32,
    /// Subtracted from every ceiling sweep so a grazing contact does not block standing.
    pub clearance_margin: f32,
    pub probe_radius_factor: f32,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            standing: CapsuleRequest::new(tuning::STAND_HEIGHT, tuning::STAND_CENTER),
            crouching: CapsuleRequest::new(tuning::CROUCH_HEIGHT, tuning::CROUCH_CENTER),
            proning: CapsuleRequest::new(tuning::PRONE_HEIGHT, tuning::PRONE_CENTER),
            sliding: CapsuleRequest::new(tuning::SLIDE_HEIGHT, tuning::SLIDE_CENTER),
            crouch_speed: tuning::CROUCH_SPEED,
            crouch_backwards_speed: tuning::CROUCH_BACKWARDS_SPEED,
            prone_speed: tuning::PRONE_SPEED,
            prone_backwards_speed: tuning::PRONE_BACKWARDS_SPEED,
            clearance_margin: tuning::CEILING_CLEARANCE_MARGIN,
            probe_radius_factor: tuning::PROBE_RADIUS_FACTOR,
        }
    }
}

impl StanceConfig {
    /// Capsule preset for a stance.
    pub fn capsule(&self, stance: Stance) -> CapsuleRequest {
        match stance {
            Stance::Standing => self.standing,
            Stance::Crouching => self.crouching,
            Stance::Proning => self.proning,
            Stance::Sliding => self.sliding,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    pub slope_boost: f32,
    pub flat_boost: f32,
    /// Per-second lerp rate toward zero; the per-tick factor is clamped to [0, 1].
    pub friction: f32,
    pub min_speed: f32,
    pub fall_grace_time: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            slope_boost: tuning::SLIDE_SLOPE_BOOST,
            flat_boost: tuning::FLAT_SLIDE_BOOST,
            friction: tuning::SLIDE_FRICTION,
            min_speed: tuning::MIN_SLIDE_SPEED,
            fall_grace_time: tuning::SLIDE_FALL_GRACE_TIME,
        }
    }
}

// =============================================================================
// LOADING & VALIDATION
// =============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read locomotion config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse locomotion config: {e}"),
            ConfigError::Invalid(reason) => write!(f, "invalid locomotion config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

impl LocomotionConfig {
    /// Parse and validate a RON document.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: LocomotionConfig = ron::from_str(text)?;
        if let Err(e) = config.validate() {
            warn!("Rejected locomotion config: {e}");
            return Err(e);
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        debug!("Loaded locomotion config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("movement.walk_speed", self.movement.walk_speed),
            ("movement.run_speed", self.movement.run_speed),
            ("movement.backward_walk_factor", self.movement.backward_walk_factor),
            ("movement.rotation_speed", self.movement.rotation_speed),
            ("movement.idle_threshold", self.movement.idle_threshold),
            ("jump.jump_force", self.jump.jump_force),
            ("jump.flip_force", self.jump.flip_force),
            ("jump.buffer_window", self.jump.buffer_window),
            ("fall.grace_time", self.fall.grace_time),
            ("stance.crouch_speed", self.stance.crouch_speed),
            ("stance.crouch_backwards_speed", self.stance.crouch_backwards_speed),
            ("stance.prone_speed", self.stance.prone_speed),
            ("stance.prone_backwards_speed", self.stance.prone_backwards_speed),
            ("stance.clearance_margin", self.stance.clearance_margin),
            ("stance.probe_radius_factor", self.stance.probe_radius_factor),
            ("slide.slope_boost", self.slide.slope_boost),
            ("slide.flat_boost", self.slide.flat_boost),
            ("slide.friction", self.slide.friction),
            ("slide.min_speed", self.slide.min_speed),
            ("slide.fall_grace_time", self.slide.fall_grace_time),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        for (name, value) in [
            ("jump.gravity", self.jump.gravity),
            ("jump.grounded_velocity_floor", self.jump.grounded_velocity_floor),
            ("fall.velocity_threshold", self.fall.velocity_threshold),
        ] {
            if !value.is_finite() || value > 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite, non-positive number (got {value})"
                )));
            }
        }

        let s = &self.stance;
        for (stance, capsule) in [
            (Stance::Standing, s.standing),
            (Stance::Crouching, s.crouching),
            (Stance::Proning, s.proning),
            (Stance::Sliding, s.sliding),
        ] {
            if !(capsule.height.is_finite() && capsule.height > 0.0 && capsule.center_offset.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{stance:?} capsule must have a positive height (got {capsule:?})"
                )));
            }
        }
        if !(s.proning.height < s.crouching.height && s.crouching.height < s.standing.height) {
            return Err(ConfigError::Invalid(format!(
                "capsule heights must satisfy prone < crouch < stand (got {} / {} / {})",
                s.proning.height, s.crouching.height, s.standing.height
            )));
        }
        let shortest_gap = (s.standing.height - s.crouching.height).min(s.crouching.height - s.proning.height);
        if s.clearance_margin > shortest_gap {
            return Err(ConfigError::Invalid(format!(
                "stance.clearance_margin {} exceeds the smallest stance height gap {}",
                s.clearance_margin, shortest_gap
            )));
        }

        Ok(())
    }
}
