use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{EnvError, EnvResult};
use crate::render::RenderMode;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DroneConfig {
    /// Full width and height of the box collider.
    pub size: (f64, f64),
    pub mass: f64,
    pub start_position: (f64, f64),
    /// Half-width of the uniform x offset added at reset. Zero disables jitter.
    pub start_jitter: f64,
    pub side_impulse: f64,
    pub up_impulse: f64,
}

impl Default for DroneConfig {
    fn default() -> Self {
        DroneConfig {
            size: (40.0, 20.0),
            mass: 1.0,
            start_position: (400.0, 500.0),
            start_jitter: 100.0,
            side_impulse: 100.0,
            up_impulse: 200.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhysicsBackend {
    #[default]
    Rapier,
    Euler,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    pub gravity: (f64, f64),
    pub dt: f64,
    pub backend: PhysicsBackend,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width: 800.0,
            height: 600.0,
            gravity: (0.0, -900.0),
            dt: 1.0 / 60.0,
            backend: PhysicsBackend::Rapier,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    pub center: (f64, f64),
    /// Drawn radius of the landing pad.
    pub radius: f64,
    /// Normalized distance under which a touchdown counts as a landing.
    pub landing_tolerance: f64,
    /// Body height at or below which the drone is in ground contact.
    pub contact_height: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            center: (400.0, 50.0),
            radius: 15.0,
            landing_tolerance: 0.1,
            contact_height: 55.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RewardConfig {
    pub angle_weight: f64,
    pub landing_bonus: f64,
    pub crash_penalty: f64,
    pub out_of_bounds_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        RewardConfig {
            angle_weight: 0.1,
            landing_bonus: 10.0,
            crash_penalty: 100.0,
            out_of_bounds_penalty: 100.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Step count at which the episode is truncated. `None` disables truncation.
    pub max_steps: Option<u32>,
    /// Reject out-of-range actions instead of treating them as no-ops.
    pub strict_actions: bool,
    pub render_mode: Option<RenderMode>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        EpisodeConfig {
            max_steps: Some(1000),
            strict_actions: true,
            render_mode: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct DroneEnvironmentConfig {
    pub drone: DroneConfig,
    pub world: WorldConfig,
    pub target: TargetConfig,
    pub reward: RewardConfig,
    pub episode: EpisodeConfig,
}

impl DroneEnvironmentConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> EnvResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DroneEnvironmentConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> EnvResult<()> {
        let yaml_string = serde_yaml::to_string(self)?;
        fs::write(path, yaml_string)?;
        Ok(())
    }

    pub fn validate(&self) -> EnvResult<()> {
        let positive = [
            ("drone.size.0", self.drone.size.0),
            ("drone.size.1", self.drone.size.1),
            ("drone.mass", self.drone.mass),
            ("world.width", self.world.width),
            ("world.height", self.world.height),
            ("world.dt", self.world.dt),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EnvError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        if !(self.drone.start_jitter.is_finite() && self.drone.start_jitter >= 0.0) {
            return Err(EnvError::InvalidConfig(format!(
                "drone.start_jitter must be non-negative, got {}",
                self.drone.start_jitter
            )));
        }

        if self.episode.max_steps == Some(0) {
            return Err(EnvError::InvalidConfig(
                "episode.max_steps must be at least 1 (use null to disable truncation)".into(),
            ));
        }

        Ok(())
    }
}
