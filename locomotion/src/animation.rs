//! Animation signals produced every tick.
//!
//! Levels are recomputed from scratch each tick; triggers are one-shot edges that only
//! appear in the set for the tick that produced them.

use serde::{Deserialize, Serialize};

/// One-shot animation cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationTrigger {
    Jump,
    AirJump,
    Crouch,
    Prone,
    /// Prone back up to crouch.
    ProneExit,
    Slide,
    Dance,
    Fall,
}

impl AnimationTrigger {
    /// Animator parameter name.
    pub fn name(self) -> &'static str {
        match self {
            AnimationTrigger::Jump => "JumpTrigger",
            AnimationTrigger::AirJump => "AirJumpTrigger",
            AnimationTrigger::Crouch => "CrouchTrigger",
            AnimationTrigger::Prone => "ProneTrigger",
            AnimationTrigger::ProneExit => "ProneExitTrigger",
            AnimationTrigger::Slide => "SlideTrigger",
            AnimationTrigger::Dance => "DanceTrigger",
            AnimationTrigger::Fall => "FallTrigger",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationSignalSet {
    pub is_walking: bool,
    pub is_running: bool,
    pub is_walking_backwards: bool,
    pub is_crouching: bool,
    pub is_proning: bool,
    pub is_sliding: bool,
    pub is_jumping: bool,
    pub is_falling: bool,
    pub is_flipping: bool,
    pub is_dancing: bool,
    pub triggers: Vec<AnimationTrigger>,
}

impl AnimationSignalSet {
    /// Levels keyed by animator parameter name.
    pub fn levels(&self) -> [(&'static str, bool); 10] {
        [
            ("IsWalking", self.is_walking),
            ("IsRunning", self.is_running),
            ("IsWalkingBackwards", self.is_walking_backwards),
            ("IsCrouching", self.is_crouching),
            ("IsProning", self.is_proning),
            ("IsSliding", self.is_sliding),
            ("IsJumping", self.is_jumping),
            ("IsFalling", self.is_falling),
            ("IsFlipping", self.is_flipping),
            ("IsDancing", self.is_dancing),
        ]
    }

    pub fn fired(&self, trigger: AnimationTrigger) -> bool {
        self.triggers.contains(&trigger)
    }

    pub fn fired_count(&self, trigger: AnimationTrigger) -> usize {
        self.triggers.iter().filter(|t| **t == trigger).count()
    }
}

/// Receives the full signal set once per tick.
pub trait AnimationSink {
    fn apply(&mut self, signals: &AnimationSignalSet);
}

/// Discards signals, for callers that drive no animator.
impl AnimationSink for () {
    fn apply(&mut self, _signals: &AnimationSignalSet) {}
}
