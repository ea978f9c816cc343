//! Bevy ECS integration.
//!
//! Each character entity carries a [`Locomotion`] controller; the required components hold
//! its per-tick inputs (intent, ground, headroom) and outputs (capsule, displacement,
//! animation signals). Physics stays external: a kinematic mover consumes
//! [`LocomotionDisplacement`] and resizes its collider from [`CapsuleShape`].

use std::sync::{Arc, PoisonError, RwLock};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationSignalSet, AnimationSink, AnimationTrigger};
use crate::body::{CeilingProbe, CeilingSweep, CharacterBody};
use crate::config::{tuning, LocomotionConfig};
use crate::controller::LocomotionController;
use crate::error::LocomotionError;
use crate::input::{CameraBasis, GroundInfo, InputSnapshot, OrientationSource};
use crate::state::CapsuleRequest;

pub struct LocomotionPlugin;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocomotionSet;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraBasisHandle>()
            .add_message::<AnimationEvent>()
            .add_message::<LocomotionTriggerFired>();

        app.add_systems(
            FixedUpdate,
            (sync_camera_basis, apply_animation_events, tick_locomotion)
                .chain()
                .in_set(LocomotionSet),
        );
    }
}

// =============================================================================
// COMPONENTS
// =============================================================================

#[derive(Component)]
#[require(
    Transform,
    LocomotionInput,
    GroundInfo,
    CeilingGap,
    CapsuleShape,
    LocomotionDisplacement,
    AnimationSignals
)]
pub struct Locomotion(pub LocomotionController);

impl Locomotion {
    pub fn new(
        config: LocomotionConfig,
        orientation: impl OrientationSource + Send + Sync + 'static,
    ) -> Result<Self, LocomotionError> {
        LocomotionController::new(config, orientation).map(Self)
    }
}

/// Player intent for the next tick. Edges are cleared once the tick has consumed them.
#[derive(Component, Clone, Debug, Default)]
pub struct LocomotionInput(pub InputSnapshot);

/// Free height above the feet, as reported by a ceiling sensor. `None` means open sky.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct CeilingGap(pub Option<f32>);

/// Collider shape the physics side should use.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct CapsuleShape {
    pub height: f32,
    pub center_offset: f32,
    pub radius: f32,
}

impl Default for CapsuleShape {
    fn default() -> Self {
        Self {
            height: tuning::STAND_HEIGHT,
            center_offset: tuning::STAND_CENTER,
            radius: tuning::BODY_RADIUS,
        }
    }
}

impl CapsuleShape {
    fn apply(&mut self, capsule: CapsuleRequest) {
        self.height = capsule.height;
        self.center_offset = capsule.center_offset;
    }
}

/// Displacement requested by the last tick.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct LocomotionDisplacement(pub Vec3);

/// Signal set produced by the last tick.
#[derive(Component, Clone, Debug, Default)]
pub struct AnimationSignals(pub AnimationSignalSet);

impl AnimationSink for AnimationSignals {
    fn apply(&mut self, signals: &AnimationSignalSet) {
        self.0.clone_from(signals);
    }
}

/// Marks the camera whose orientation drives movement input.
#[derive(Component, Default)]
pub struct LocomotionCamera;

// =============================================================================
// RESOURCES & MESSAGES
// =============================================================================

/// Shared camera basis. Clone it into each controller as its [`OrientationSource`].
#[derive(Resource, Clone, Default)]
pub struct CameraBasisHandle(Arc<RwLock<CameraBasis>>);

impl CameraBasisHandle {
    pub fn set(&self, basis: CameraBasis) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = basis;
    }
}

impl OrientationSource for CameraBasisHandle {
    fn basis(&self) -> CameraBasis {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnimationEventKind {
    Jump,
    JumpWithForce(f32),
    BeginFlip,
    EndFlip,
    BeginProneTransition,
    EndProneTransition,
}

impl AnimationEventKind {
    /// Forward the event to the controller. Returns `false` if the controller rejected it.
    pub fn apply_to(self, controller: &mut LocomotionController) -> bool {
        match self {
            AnimationEventKind::Jump => controller.jump(),
            AnimationEventKind::JumpWithForce(force) => controller.jump_with_force(force),
            AnimationEventKind::BeginFlip => controller.begin_flip(),
            AnimationEventKind::EndFlip => {
                controller.end_flip();
                true
            }
            AnimationEventKind::BeginProneTransition => {
                controller.begin_prone_transition();
                true
            }
            AnimationEventKind::EndProneTransition => {
                controller.end_prone_transition();
                true
            }
        }
    }
}

/// Sent by the animation side at the matching frame of a clip.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct AnimationEvent {
    pub entity: Entity,
    pub kind: AnimationEventKind,
}

/// One per trigger fired during a tick.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct LocomotionTriggerFired {
    pub entity: Entity,
    pub trigger: AnimationTrigger,
}

// =============================================================================
// SYSTEMS
// =============================================================================

pub fn sync_camera_basis(
    cameras: Query<&GlobalTransform, With<LocomotionCamera>>,
    handle: Res<CameraBasisHandle>,
) {
    let Ok(camera) = cameras.single() else {
        return;
    };
    handle.set(CameraBasis::from_transform(camera));
}

pub fn apply_animation_events(
    mut events: MessageReader<AnimationEvent>,
    mut characters: Query<&mut Locomotion>,
) {
    for event in events.read() {
        let Ok(mut locomotion) = characters.get_mut(event.entity) else {
            warn!("Animation event {:?} for {} which has no locomotion", event.kind, event.entity);
            continue;
        };
        if !event.kind.apply_to(&mut locomotion.0) {
            trace!("{}: {:?} rejected", event.entity, event.kind);
        }
    }
}

#[allow(clippy::type_complexity)]
pub fn tick_locomotion(
    time: Res<Time>,
    mut characters: Query<(
        Entity,
        &mut Locomotion,
        &mut LocomotionInput,
        &GroundInfo,
        &CeilingGap,
        &mut CapsuleShape,
        &mut Transform,
        &mut LocomotionDisplacement,
        &mut AnimationSignals,
    )>,
    mut fired: MessageWriter<LocomotionTriggerFired>,
) {
    let dt = time.delta_secs();

    for (entity, mut locomotion, mut input, ground, gap, mut capsule, mut transform, mut displacement, mut signals) in
        &mut characters
    {
        let mut body = EcsBody {
            transform: &mut *transform,
            capsule: &mut *capsule,
            gap: gap.0,
            displacement: Vec3::ZERO,
        };
        locomotion.0.tick(&input.0, ground, dt, &mut body, &mut *signals);
        displacement.0 = body.displacement;

        for &trigger in &signals.0.triggers {
            trace!("{entity}: {}", trigger.name());
            fired.write(LocomotionTriggerFired { entity, trigger });
        }
        input.0.clear_edges();
    }
}

/// Adapts an entity's components to [`CharacterBody`] for one tick.
struct EcsBody<'a> {
    transform: &'a mut Transform,
    capsule: &'a mut CapsuleShape,
    gap: Option<f32>,
    displacement: Vec3,
}

impl CeilingProbe for EcsBody<'_> {
    fn is_clear(&self, sweep: &CeilingSweep) -> bool {
        match self.gap {
            None => true,
            Some(gap) => sweep.top() - self.transform.translation.y <= gap,
        }
    }
}

impl CharacterBody for EcsBody<'_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn radius(&self) -> f32 {
        self.capsule.radius
    }

    fn move_by(&mut self, displacement: Vec3) {
        self.displacement += displacement;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    fn set_capsule(&mut self, capsule: CapsuleRequest) {
        self.capsule.apply(capsule);
    }
}
