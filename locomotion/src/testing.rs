//! Test doubles for the physics and animation collaborators.

use bevy::prelude::*;

use crate::animation::{AnimationSignalSet, AnimationSink};
use crate::body::{CeilingProbe, CeilingSweep, CharacterBody};
use crate::state::{CapsuleRequest, Stance};

/// Body with scripted ceiling answers that records everything it is asked to do.
pub struct TestBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub radius: f32,
    pub stand_clear: bool,
    pub crouch_clear: bool,
    pub capsules: Vec<CapsuleRequest>,
    pub sweeps: std::cell::RefCell<Vec<CeilingSweep>>,
}

impl Default for TestBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            radius: 0.3,
            stand_clear: true,
            crouch_clear: true,
            capsules: Vec::new(),
            sweeps: Default::default(),
        }
    }
}

impl TestBody {
    pub fn blocked(stand_clear: bool, crouch_clear: bool) -> Self {
        Self {
            stand_clear,
            crouch_clear,
            ..default()
        }
    }
}

impl CeilingProbe for TestBody {
    fn is_clear(&self, sweep: &CeilingSweep) -> bool {
        self.sweeps.borrow_mut().push(*sweep);
        match sweep.target {
            Stance::Crouching => self.crouch_clear,
            _ => self.stand_clear,
        }
    }
}

impl CharacterBody for TestBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn move_by(&mut self, displacement: Vec3) {
        self.position += displacement;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn set_capsule(&mut self, capsule: CapsuleRequest) {
        self.capsules.push(capsule);
    }
}

/// Keeps every signal set it receives.
#[derive(Default)]
pub struct RecordingAnimator {
    pub frames: Vec<AnimationSignalSet>,
}

impl AnimationSink for RecordingAnimator {
    fn apply(&mut self, signals: &AnimationSignalSet) {
        self.frames.push(signals.clone());
    }
}
