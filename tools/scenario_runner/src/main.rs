//! Headless locomotion scenario runner.
//!
//! Reads a RON scenario (first CLI argument, or `scenarios/obstacle_course.ron` next to this
//! crate), drives a single character through it on a flat floor at y = 0, and logs what the
//! controller did on every tick followed by a summary.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use bevy::app::AppExit;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use serde::Deserialize;

use locomotion::{
    AnimationEventKind, AnimationTrigger, CameraBasis, CapsuleRequest, CeilingProbe, CeilingSweep,
    CharacterBody, GroundInfo, InputSnapshot, LocomotionConfig, LocomotionController, LocomotionError, Stance,
};

const DEFAULT_SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/obstacle_course.ron");

/// Height below which the body counts as standing on the floor.
const FLOOR_EPSILON: f32 = 1e-4;

// -----------------------------------------------------------------------------
// Scenario types
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct Scenario {
    #[serde(default)]
    config: LocomotionConfig,
    #[serde(default = "default_dt")]
    dt: f32,
    #[serde(default = "default_body_radius")]
    body_radius: f32,
    /// Call `jump()` on the tick a jump trigger fires, in place of the takeoff animation event.
    #[serde(default)]
    auto_takeoff: bool,
    steps: Vec<ScenarioStep>,
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

fn default_body_radius() -> f32 {
    0.3
}

#[derive(Debug, Clone, Deserialize)]
struct ScenarioStep {
    #[serde(default)]
    label: Option<String>,
    ticks: u32,
    #[serde(default)]
    input: InputSnapshot,
    /// Ground normal reported while on the floor. Only the slide physics sees the slope.
    #[serde(default)]
    normal: Option<Vec3>,
    /// Free height above the feet.
    #[serde(default)]
    ceiling: Option<f32>,
    /// Animation events delivered before the step's first tick.
    #[serde(default)]
    events: Vec<AnimationEventKind>,
}

#[derive(Resource)]
struct ScenarioPath(PathBuf);

// -----------------------------------------------------------------------------
// Flat-floor body
// -----------------------------------------------------------------------------

struct FloorBody {
    position: Vec3,
    rotation: Quat,
    radius: f32,
    ceiling: Option<f32>,
    capsule: CapsuleRequest,
    capsule_changes: u32,
}

impl FloorBody {
    fn new(radius: f32, capsule: CapsuleRequest) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            radius,
            ceiling: None,
            capsule,
            capsule_changes: 0,
        }
    }

    fn on_floor(&self) -> bool {
        self.position.y <= FLOOR_EPSILON
    }
}

impl CeilingProbe for FloorBody {
    fn is_clear(&self, sweep: &CeilingSweep) -> bool {
        self.ceiling
            .is_none_or(|ceiling| sweep.top() - self.position.y <= ceiling)
    }
}

impl CharacterBody for FloorBody {
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
        self.position.y = self.position.y.max(0.0);
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn set_capsule(&mut self, capsule: CapsuleRequest) {
        self.capsule = capsule;
        self.capsule_changes += 1;
    }
}

// -----------------------------------------------------------------------------
// Running
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Summary {
    ticks: u32,
    final_position: Vec3,
    final_stance: Stance,
    final_capsule: CapsuleRequest,
    capsule_changes: u32,
    max_height: f32,
    airborne_ticks: u32,
    triggers: BTreeMap<&'static str, u32>,
}

fn load_scenario(path: &PathBuf) -> Result<Scenario, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let scenario: Scenario = ron::from_str(&text)?;
    Ok(scenario)
}

fn run(scenario: &Scenario) -> Result<Summary, LocomotionError> {
    let mut controller = LocomotionController::new(scenario.config.clone(), CameraBasis::default())?;
    let mut body = FloorBody::new(scenario.body_radius, controller.capsule());
    let mut summary = Summary::default();

    for (index, step) in scenario.steps.iter().enumerate() {
        let label = step.label.as_deref().unwrap_or("-");
        info!("Step {index} ({label}): {} ticks", step.ticks);

        body.ceiling = step.ceiling;
        for &event in &step.events {
            if !event.apply_to(&mut controller) {
                info!("  {event:?} rejected");
            }
        }

        let mut input = step.input.clone();
        for _ in 0..step.ticks {
            let grounded = body.on_floor();
            let ground = GroundInfo {
                grounded,
                normal: if grounded { step.normal.unwrap_or(Vec3::Y) } else { Vec3::Y },
            };

            controller.tick(&input, &ground, scenario.dt, &mut body, &mut ());
            input.clear_edges();

            let triggers = controller.signals().triggers.clone();
            for trigger in &triggers {
                *summary.triggers.entry(trigger.name()).or_default() += 1;
            }
            let takeoff = triggers
                .iter()
                .any(|t| matches!(t, AnimationTrigger::Jump | AnimationTrigger::AirJump));
            if scenario.auto_takeoff && takeoff {
                controller.jump();
            }

            let state = controller.state();
            info!(
                "#{:04} {:?} capsule={:.2} pos=({:.2}, {:.2}, {:.2}) vy={:.2} falling={} triggers={:?}",
                summary.ticks,
                state.stance,
                body.capsule.height,
                body.position.x,
                body.position.y,
                body.position.z,
                state.vertical_velocity,
                state.is_falling,
                triggers.iter().map(|t| t.name()).collect::<Vec<_>>(),
            );

            summary.ticks += 1;
            summary.max_height = summary.max_height.max(body.position.y);
            if !grounded {
                summary.airborne_ticks += 1;
            }
        }
    }

    summary.final_position = body.position;
    summary.final_stance = controller.stance();
    summary.final_capsule = body.capsule;
    summary.capsule_changes = body.capsule_changes;
    Ok(summary)
}

fn run_scenario(path: Res<ScenarioPath>, mut exit: MessageWriter<AppExit>) {
    let scenario = match load_scenario(&path.0) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!("Failed to load scenario {:?}: {e}", path.0);
            exit.write(AppExit::error());
            return;
        }
    };
    info!("Running {:?} ({} steps, dt={})", path.0, scenario.steps.len(), scenario.dt);

    match run(&scenario) {
        Ok(summary) => {
            info!(
                "Done: {} ticks ({} airborne), final {:?} (capsule {:.2}, {} resizes) at ({:.2}, {:.2}, {:.2}), peak height {:.2}",
                summary.ticks,
                summary.airborne_ticks,
                summary.final_stance,
                summary.final_capsule.height,
                summary.capsule_changes,
                summary.final_position.x,
                summary.final_position.y,
                summary.final_position.z,
                summary.max_height,
            );
            for (name, count) in &summary.triggers {
                info!("  {name}: {count}");
            }
            exit.write(AppExit::Success);
        }
        Err(e) => {
            error!("Scenario {:?} failed: {e}", path.0);
            exit.write(AppExit::error());
        }
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENARIO));

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(LogPlugin::default());
    app.insert_resource(ScenarioPath(path));
    app.add_systems(Startup, run_scenario);
    app.run();
}
