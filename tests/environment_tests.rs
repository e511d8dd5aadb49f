//! Episode-level behavior of the drone environment through the public API.

use std::sync::{Arc, Mutex};

use drone_landing_env::physics::BodyState;
use drone_landing_env::render::{Frame, FrameSink, RenderMode, BLUE, GREEN};
use drone_landing_env::{
    Action, DroneEnvironment, DroneEnvironmentConfig, EnvError, EnvResult, EpisodePhase,
    PhysicsBackend, ResetOptions,
};
use nalgebra::Vector2;

// ============================================================================
// Helper Functions
// ============================================================================

fn config(backend: PhysicsBackend, gravity: f64) -> DroneEnvironmentConfig {
    let mut config = DroneEnvironmentConfig::default();
    config.world.backend = backend;
    config.world.gravity = (0.0, gravity);
    config.drone.start_jitter = 0.0;
    config
}

fn start_at(x: f64, y: f64) -> Option<ResetOptions> {
    Some(ResetOptions {
        start_position: Some((x, y)),
    })
}

#[derive(Default)]
struct SinkLog {
    opened: usize,
    frames: usize,
    closed: usize,
}

struct SharedSink(Arc<Mutex<SinkLog>>);

impl FrameSink for SharedSink {
    fn open(&mut self, _width: usize, _height: usize) -> EnvResult<()> {
        self.0.lock().unwrap().opened += 1;
        Ok(())
    }

    fn present(&mut self, _frame: &Frame) -> EnvResult<()> {
        self.0.lock().unwrap().frames += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.0.lock().unwrap().closed += 1;
    }
}

struct BrokenSink;

impl FrameSink for BrokenSink {
    fn open(&mut self, _width: usize, _height: usize) -> EnvResult<()> {
        Ok(())
    }

    fn present(&mut self, _frame: &Frame) -> EnvResult<()> {
        Err(EnvError::Render("window lost".to_string()))
    }

    fn close(&mut self) {}
}

fn human_config(gravity: f64) -> DroneEnvironmentConfig {
    let mut cfg = config(PhysicsBackend::Euler, gravity);
    cfg.episode.render_mode = Some(RenderMode::Human);
    cfg
}

// ============================================================================
// Truncation
// ============================================================================

#[test]
fn should_truncate_on_max_steps_with_both_backends() {
    for backend in [PhysicsBackend::Euler, PhysicsBackend::Rapier] {
        let mut env = DroneEnvironment::new(config(backend, 0.0)).unwrap();
        env.reset(None, None);

        for step in 1..=1000 {
            let result = env.step(Action::None).unwrap();
            assert!(!result.terminated, "{backend:?} terminated at step {step}");
            assert_eq!(result.truncated, step == 1000, "{backend:?} step {step}");
        }

        assert_eq!(env.phase(), EpisodePhase::Terminated);
        assert!(matches!(env.step(Action::None), Err(EnvError::EpisodeEnded)));
    }
}

#[test]
fn should_never_truncate_when_disabled() {
    let mut cfg = config(PhysicsBackend::Euler, 0.0);
    cfg.episode.max_steps = None;
    let mut env = DroneEnvironment::new(cfg).unwrap();
    env.reset(None, None);

    for _ in 0..1500 {
        let result = env.step(Action::None).unwrap();
        assert!(!result.done());
    }
    assert_eq!(env.step_count(), 1500);
}

// ============================================================================
// Actions
// ============================================================================

#[test]
fn should_change_velocity_by_impulse_over_mass() {
    let cases = [
        (Action::None, Vector2::new(0.0, 0.0)),
        (Action::ThrustLeft, Vector2::new(-100.0, 0.0)),
        (Action::ThrustRight, Vector2::new(100.0, 0.0)),
        (Action::ThrustUp, Vector2::new(0.0, 200.0)),
    ];

    for (action, expected) in cases {
        let mut env = DroneEnvironment::new(config(PhysicsBackend::Euler, 0.0)).unwrap();
        env.reset(None, start_at(400.0, 300.0));
        let mut prior = BodyState::at_rest(Vector2::new(400.0, 300.0));
        prior.velocity = Vector2::new(-7.0, 11.0);
        env.set_state(prior);

        let obs = env.step(action).unwrap().observation;

        assert_eq!(obs.vx - prior.velocity.x, expected.x, "{action:?}");
        assert_eq!(obs.vy - prior.velocity.y, expected.y, "{action:?}");
    }
}

#[test]
fn should_apply_gravity_after_impulse_with_rapier() {
    let mut env = DroneEnvironment::new(config(PhysicsBackend::Rapier, -900.0)).unwrap();
    env.reset(None, start_at(400.0, 300.0));

    let obs = env.step(Action::ThrustUp).unwrap().observation;

    assert!((obs.vy - (200.0 - 15.0)).abs() < 1e-6);
    assert!(obs.vx.abs() < 1e-9);
    assert!(obs.y > 300.0);
}

#[test]
fn should_reject_invalid_actions_in_strict_mode() {
    let mut env = DroneEnvironment::new(config(PhysicsBackend::Euler, 0.0)).unwrap();
    env.reset(None, None);

    assert!(matches!(env.step_raw(4), Err(EnvError::InvalidAction(4))));
    assert_eq!(env.step_count(), 0);
    assert_eq!(env.phase(), EpisodePhase::Running);
    assert!(env.step_raw(3).is_ok());
}

#[test]
fn should_treat_invalid_actions_as_noop_in_lenient_mode() {
    let mut cfg = config(PhysicsBackend::Euler, 0.0);
    cfg.episode.strict_actions = false;
    let mut env = DroneEnvironment::new(cfg).unwrap();
    env.reset(None, None);

    let result = env.step_raw(42).unwrap();

    assert_eq!(result.observation.vx, 0.0);
    assert_eq!(result.observation.vy, 0.0);
    assert_eq!(env.step_count(), 1);
}

// ============================================================================
// Termination
// ============================================================================

#[test]
fn should_land_when_falling_onto_target() {
    let mut env = DroneEnvironment::new(DroneEnvironmentConfig {
        drone: drone_landing_env::DroneConfig {
            start_jitter: 0.0,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    env.reset(None, None);

    let mut last = None;
    for _ in 0..200 {
        let result = env.step(Action::None).unwrap();
        if result.done() {
            last = Some(result);
            break;
        }
    }

    let result = last.expect("free fall should reach the ground");
    assert!(result.terminated);
    assert!(!result.truncated);
    assert_eq!(result.observation.ground_contact, 1.0);
    assert!(result.reward > 9.0);
}

#[test]
fn should_crash_when_touching_down_away_from_target() {
    let mut env = DroneEnvironment::new(config(PhysicsBackend::Euler, -900.0)).unwrap();
    env.reset(None, start_at(100.0, 70.0));

    let mut result = env.step(Action::None).unwrap();
    while !result.done() {
        result = env.step(Action::None).unwrap();
    }

    assert!(result.terminated);
    assert!(result.reward < -100.0);
}

#[test]
fn should_terminate_when_leaving_the_world() {
    let mut env = DroneEnvironment::new(config(PhysicsBackend::Euler, 0.0)).unwrap();
    env.reset(None, start_at(790.0, 300.0));

    let mut result = env.step(Action::ThrustRight).unwrap();
    while !result.done() {
        result = env.step(Action::ThrustRight).unwrap();
    }

    assert!(result.terminated);
    assert!(result.observation.x > 800.0);
    assert_eq!(result.observation.ground_contact, 0.0);
    assert!(result.reward < -100.0);
}

#[test]
fn should_end_episode_on_non_finite_state() {
    let mut env = DroneEnvironment::new(config(PhysicsBackend::Euler, 0.0)).unwrap();
    env.reset(None, start_at(400.0, 300.0));
    let mut state = env.state();
    state.velocity.x = f64::INFINITY;
    env.set_state(state);

    assert!(matches!(env.step(Action::None), Err(EnvError::NonFiniteState(_))));
    assert_eq!(env.phase(), EpisodePhase::Terminated);
    assert!(env.get_done());
    assert!(matches!(env.step(Action::None), Err(EnvError::EpisodeEnded)));

    let (obs, _) = env.reset(None, None);
    assert!(obs.to_array().iter().all(|v| v.is_finite()));
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn should_reset_counter_and_contact_after_episode_end() {
    let mut env = DroneEnvironment::new(config(PhysicsBackend::Rapier, -900.0)).unwrap();
    env.reset(None, None);
    while !env.step(Action::None).unwrap().done() {}
    assert!(env.get_done());

    let (obs, _) = env.reset(None, None);

    assert_eq!(env.step_count(), 0);
    assert_eq!(env.phase(), EpisodePhase::Running);
    assert_eq!(obs.ground_contact, 0.0);
    assert_eq!((obs.x, obs.y), (400.0, 500.0));
    assert_eq!((obs.vx, obs.vy), (0.0, 0.0));
    assert_eq!(env.episode_return(), 0.0);
}

#[test]
fn should_reproduce_trajectories_with_same_seed() {
    let mut cfg = DroneEnvironmentConfig::default();
    cfg.world.backend = PhysicsBackend::Rapier;
    let actions = [Action::ThrustUp, Action::ThrustLeft, Action::None, Action::ThrustRight];

    let run = |seed: u64| {
        let mut env = DroneEnvironment::new(cfg.clone()).unwrap();
        let (first, _) = env.reset(Some(seed), None);
        let mut trace = vec![first];
        for action in actions.iter().cycle().take(30) {
            let result = env.step(*action).unwrap();
            trace.push(result.observation);
            if result.done() {
                break;
            }
        }
        trace
    };

    assert_eq!(run(11), run(11));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn should_render_rgb_frame_of_world_size() {
    let mut cfg = config(PhysicsBackend::Euler, 0.0);
    cfg.episode.render_mode = Some(RenderMode::RgbArray);
    let mut env = DroneEnvironment::new(cfg).unwrap();

    assert!(matches!(env.render(), Err(EnvError::RenderBeforeInit)));
    env.reset(None, None);
    let before = env.state();

    let frame = env.render().unwrap().expect("rgb_array mode returns a frame");

    assert_eq!((frame.width, frame.height), (800, 600));
    assert_eq!(frame.pixels.len(), 800 * 600 * 3);
    assert_eq!(frame.pixel(400, 549), GREEN);
    assert_eq!(frame.pixel(400, 100), BLUE);
    assert_eq!(env.state(), before);
}

#[test]
fn should_fail_human_render_without_display() {
    let mut cfg = config(PhysicsBackend::Euler, 0.0);
    cfg.episode.render_mode = Some(RenderMode::Human);
    let mut env = DroneEnvironment::new(cfg).unwrap();
    env.reset(None, None);

    assert!(matches!(env.step(Action::None), Err(EnvError::DisplayUnavailable)));
    assert!(matches!(env.render(), Err(EnvError::DisplayUnavailable)));
}

#[test]
fn should_leave_episode_untouched_when_display_is_missing() {
    let mut env = DroneEnvironment::new(human_config(-900.0)).unwrap();
    env.reset(None, start_at(100.0, 55.2));
    let before = env.state();

    // The would-be crash step is refused before anything advances.
    assert!(matches!(env.step(Action::None), Err(EnvError::DisplayUnavailable)));
    assert_eq!(env.step_count(), 0);
    assert_eq!(env.phase(), EpisodePhase::Running);
    assert_eq!(env.state(), before);
    assert_eq!(env.episode_return(), 0.0);

    let log = Arc::new(Mutex::new(SinkLog::default()));
    env.attach_display(Box::new(SharedSink(log.clone())));
    let result = env.step(Action::None).unwrap();

    assert!(result.terminated);
    assert!(result.reward < -100.0);
    assert_eq!(env.step_count(), 1);
    assert_eq!(log.lock().unwrap().frames, 1);
}

#[test]
fn should_keep_step_outcome_when_presenting_a_frame_fails() {
    let mut env = DroneEnvironment::new(human_config(-900.0)).unwrap();
    env.attach_display(Box::new(BrokenSink));
    env.reset(None, start_at(100.0, 55.2));

    let result = env.step(Action::None).unwrap();

    assert!(result.terminated);
    assert!(result.reward < -100.0);
    assert_eq!(env.phase(), EpisodePhase::Terminated);
    assert!((env.episode_return() - result.reward).abs() < 1e-12);
}

#[test]
fn should_open_display_lazily_and_release_on_close() {
    let log = Arc::new(Mutex::new(SinkLog::default()));
    let mut cfg = config(PhysicsBackend::Euler, 0.0);
    cfg.episode.render_mode = Some(RenderMode::Human);
    let mut env = DroneEnvironment::new(cfg).unwrap();
    env.attach_display(Box::new(SharedSink(log.clone())));
    env.reset(None, None);
    assert_eq!(log.lock().unwrap().opened, 0);

    for _ in 0..3 {
        env.step(Action::None).unwrap();
    }
    assert!(env.render().unwrap().is_none());
    env.close();

    let log = log.lock().unwrap();
    assert_eq!(log.opened, 1);
    assert_eq!(log.frames, 4);
    assert_eq!(log.closed, 1);
}

#[test]
fn should_release_display_on_drop() {
    let log = Arc::new(Mutex::new(SinkLog::default()));
    {
        let mut cfg = config(PhysicsBackend::Euler, 0.0);
        cfg.episode.render_mode = Some(RenderMode::Human);
        let mut env = DroneEnvironment::new(cfg).unwrap();
        env.attach_display(Box::new(SharedSink(log.clone())));
        env.reset(None, None);
        env.step(Action::None).unwrap();
    }

    assert_eq!(log.lock().unwrap().closed, 1);
}
