//! Character locomotion state machine.
//!
//! Turns per-tick player intent and ground sensing into a displacement request, a stance
//! (with its capsule) and a set of animation signals. Physics, ray casts, cameras and
//! animation playback stay outside; they plug in through the traits in [`body`],
//! [`input`] and [`animation`].

pub mod animation;
pub mod body;
pub mod config;
pub mod controller;
pub mod error;
pub mod fall;
pub mod input;
pub mod jump;
pub mod plugin;
pub mod stance;
pub mod state;
pub mod vertical;

#[cfg(test)]
mod testing;

pub use animation::{AnimationSignalSet, AnimationSink, AnimationTrigger};
pub use body::{CeilingProbe, CeilingSweep, CharacterBody};
pub use config::{ConfigError, LocomotionConfig};
pub use controller::{LocomotionController, LocomotionControllerBuilder, TickReport};
pub use error::LocomotionError;
pub use fall::FallEdge;
pub use input::{CameraBasis, GroundInfo, InputSnapshot, OrientationSource};
pub use plugin::{
    AnimationEvent, AnimationEventKind, AnimationSignals, CameraBasisHandle, CapsuleShape, CeilingGap,
    Locomotion, LocomotionCamera, LocomotionDisplacement, LocomotionInput, LocomotionPlugin, LocomotionSet,
    LocomotionTriggerFired,
};
pub use state::{CapsuleRequest, LocomotionState, Stance};
