mod action;
mod actors;
mod config;
mod error;
mod observation_info_utils;
pub mod physics;
pub mod render;
mod reward;

#[cfg(feature = "python")]
mod python;

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

pub use action::{Action, ImpulseTable};
pub use actors::{Actor, Drone, TargetZone};
pub use config::{
    DroneConfig, DroneEnvironmentConfig, EpisodeConfig, PhysicsBackend, RewardConfig,
    TargetConfig, WorldConfig,
};
pub use error::{EnvError, EnvResult};
pub use observation_info_utils::{
    Information, Observation, OBSERVATION_HIGH, OBSERVATION_LOW, OBSERVATION_SIZE,
};
pub use reward::{evaluate, EpisodeOutcome, Outcome, WorldBounds};

use physics::{BodySpec, BodyState, EulerWorld, RapierWorld, RigidBodyWorld};
use render::{draw_scene, DisplayContext, Frame, FrameSink, RenderMode, Scene};

/// Lifecycle of an episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodePhase {
    Uninitialized,
    Running,
    Terminated,
}

/// Per-reset overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResetOptions {
    /// Exact start position. Skips the configured jitter.
    pub start_position: Option<(f64, f64)>,
}

/// Result of a single `step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Information,
}

impl StepResult {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

// Environment for RL training
pub struct DroneEnvironment {
    config: DroneEnvironmentConfig,
    drone: Drone,
    target: TargetZone,
    bounds: WorldBounds,
    phase: EpisodePhase,
    step_count: u64,
    episode_return: f64,
    rng: StdRng,
    display: DisplayContext,
}

impl DroneEnvironment {
    pub fn new(config: DroneEnvironmentConfig) -> EnvResult<Self> {
        config.validate()?;

        let gravity = Vector2::new(config.world.gravity.0, config.world.gravity.1);
        let world: Box<dyn RigidBodyWorld> = match config.world.backend {
            PhysicsBackend::Rapier => Box::new(RapierWorld::new(gravity)),
            PhysicsBackend::Euler => Box::new(EulerWorld::new(gravity)),
        };
        Ok(Self::with_world(config, world))
    }

    /// Build the environment on top of a caller-supplied physics world.
    pub fn with_world(config: DroneEnvironmentConfig, world: Box<dyn RigidBodyWorld>) -> Self {
        let spec = BodySpec {
            mass: config.drone.mass,
            half_extents: Vector2::new(config.drone.size.0 / 2.0, config.drone.size.1 / 2.0),
        };
        let impulses = ImpulseTable::new(config.drone.side_impulse, config.drone.up_impulse);
        let drone = Drone::new(spec, impulses, world, config.drone.start_position);
        let target = TargetZone::from_config(&config.target);
        let bounds = WorldBounds {
            width: config.world.width,
            height: config.world.height,
        };

        DroneEnvironment {
            config,
            drone,
            target,
            bounds,
            phase: EpisodePhase::Uninitialized,
            step_count: 0,
            episode_return: 0.0,
            rng: StdRng::from_entropy(),
            display: DisplayContext::new(),
        }
    }

    /// Create DroneEnvironment from YAML configuration file
    pub fn from_yaml_config<P: AsRef<std::path::Path>>(config_path: P) -> EnvResult<Self> {
        let config = DroneEnvironmentConfig::from_yaml_file(config_path)?;
        Self::new(config)
    }

    pub fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<ResetOptions>,
    ) -> (Observation, Information) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let start = match options.and_then(|o| o.start_position) {
            Some(position) => position,
            None => {
                let (x, y) = self.config.drone.start_position;
                let jitter = self.config.drone.start_jitter;
                if jitter > 0.0 {
                    (x + self.rng.gen_range(-jitter..jitter), y)
                } else {
                    (x, y)
                }
            }
        };

        self.drone.respawn(start);
        self.step_count = 0;
        self.episode_return = 0.0;
        self.phase = EpisodePhase::Running;
        debug!(x = start.0, y = start.1, ?seed, "episode reset");

        (self.observation(), Information)
    }

    pub fn step(&mut self, action: Action) -> EnvResult<StepResult> {
        match self.phase {
            EpisodePhase::Uninitialized => return Err(EnvError::NotReset),
            EpisodePhase::Terminated => return Err(EnvError::EpisodeEnded),
            EpisodePhase::Running => {}
        }

        // Fail before touching the episode so a missing display never eats a step.
        let human = self.config.episode.render_mode == Some(RenderMode::Human);
        if human {
            let (width, height) = self.frame_size();
            self.display.ensure_open(width as usize, height as usize)?;
        }

        self.step_count += 1;
        self.drone.apply_action(action);
        let state = match self.drone.advance(self.config.world.dt) {
            Ok(state) => state,
            Err(e) => {
                error!(step = self.step_count, "{e}");
                self.phase = EpisodePhase::Terminated;
                return Err(e);
            }
        };

        let observation = Observation::from_state(&state, &self.target);
        let scored = evaluate(&observation, &self.target, &self.bounds, &self.config.reward);
        let truncated = self
            .config
            .episode
            .max_steps
            .is_some_and(|max| self.step_count >= u64::from(max));
        self.episode_return += scored.reward;

        if scored.terminated || truncated {
            self.phase = EpisodePhase::Terminated;
            info!(
                outcome = ?scored.outcome,
                truncated,
                steps = self.step_count,
                episode_return = self.episode_return,
                "episode finished"
            );
        }

        if human {
            if let Err(e) = self.draw().and_then(|frame| self.display.present(&frame)) {
                warn!(step = self.step_count, "human render failed: {e}");
            }
        }

        Ok(StepResult {
            observation,
            reward: scored.reward,
            terminated: scored.terminated,
            truncated,
            info: Information,
        })
    }

    /// Step with a raw action index, honoring `episode.strict_actions`.
    pub fn step_raw(&mut self, action: i64) -> EnvResult<StepResult> {
        let action = Action::decode(action, self.config.episode.strict_actions)?;
        self.step(action)
    }

    /// `Some(frame)` in rgb_array mode, `None` in human mode or with no render mode.
    pub fn render(&mut self) -> EnvResult<Option<Frame>> {
        if self.phase == EpisodePhase::Uninitialized {
            return Err(EnvError::RenderBeforeInit);
        }

        match self.config.episode.render_mode {
            Some(RenderMode::RgbArray) => Ok(Some(self.draw()?)),
            Some(RenderMode::Human) => {
                let frame = self.draw()?;
                self.display.present(&frame)?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Draw the current scene regardless of render mode.
    pub fn draw(&self) -> EnvResult<Frame> {
        let (width, height) = self.frame_size();
        let corners = self.drone.corners();
        draw_scene(
            width,
            height,
            &Scene {
                drone: &corners,
                target_center: self.target.center,
                target_radius: self.target.radius,
            },
        )
    }

    fn frame_size(&self) -> (u32, u32) {
        (
            self.bounds.width.round() as u32,
            self.bounds.height.round() as u32,
        )
    }

    /// Route human-mode frames to `sink`.
    pub fn attach_display(&mut self, sink: Box<dyn FrameSink>) {
        self.display.attach(sink);
    }

    /// Release the display, if one was opened.
    pub fn close(&mut self) {
        self.display.release();
    }

    pub fn observation(&self) -> Observation {
        Observation::from_state(&self.drone.state(), &self.target)
    }

    pub fn get_information(&self) -> Information {
        Information
    }

    pub fn state(&self) -> BodyState {
        self.drone.state()
    }

    /// Overwrite the body state mid-episode.
    pub fn set_state(&mut self, state: BodyState) {
        self.drone.set_state(state);
    }

    pub fn get_drone_position(&self) -> (f64, f64) {
        self.drone.position()
    }

    pub fn target(&self) -> &TargetZone {
        &self.target
    }

    pub fn config(&self) -> &DroneEnvironmentConfig {
        &self.config
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn episode_return(&self) -> f64 {
        self.episode_return
    }

    pub fn get_done(&self) -> bool {
        self.phase == EpisodePhase::Terminated
    }
}
