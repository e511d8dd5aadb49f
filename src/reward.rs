//! Reward shaping and terminal-condition checks for a single observation.
//!
//! Touchdown is checked before the world bounds, so a body that is both in
//! ground contact and outside the world is scored as a landing or a crash.

use crate::actors::TargetZone;
use crate::config::RewardConfig;
use crate::observation_info_utils::Observation;

/// Axis-aligned world extents, `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl WorldBounds {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        WorldBounds {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    InFlight,
    Landed,
    Crashed,
    OutOfBounds,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeOutcome {
    pub reward: f64,
    pub terminated: bool,
    pub outcome: Outcome,
}

pub fn evaluate(
    obs: &Observation,
    target: &TargetZone,
    bounds: &WorldBounds,
    config: &RewardConfig,
) -> EpisodeOutcome {
    let distance = target.normalized_distance(obs.position(), bounds.width);
    let shaping = -distance - config.angle_weight * obs.angle.abs();

    let (reward, outcome) = if obs.in_contact() {
        if distance < target.landing_tolerance {
            (shaping + config.landing_bonus, Outcome::Landed)
        } else {
            (shaping - config.crash_penalty, Outcome::Crashed)
        }
    } else if !bounds.contains(obs.x, obs.y) {
        (shaping - config.out_of_bounds_penalty, Outcome::OutOfBounds)
    } else {
        (shaping, Outcome::InFlight)
    };

    EpisodeOutcome {
        reward,
        terminated: outcome != Outcome::InFlight,
        outcome,
    }
}
