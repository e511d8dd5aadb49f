use crate::actors::actor::{vector2_to_tuple, Actor};
use crate::config::TargetConfig;
use nalgebra::Vector2;

// Landing zone representation
#[derive(Clone, Debug, PartialEq)]
pub struct TargetZone {
    pub center: Vector2<f64>,
    pub radius: f64,
    pub landing_tolerance: f64,
    pub contact_height: f64,
}

impl Actor for TargetZone {
    fn position(&self) -> (f64, f64) {
        vector2_to_tuple(self.center)
    }
}

impl TargetZone {
    pub fn new(center: (f64, f64), radius: f64, landing_tolerance: f64, contact_height: f64) -> Self {
        TargetZone {
            center: Vector2::new(center.0, center.1),
            radius,
            landing_tolerance,
            contact_height,
        }
    }

    pub fn from_config(config: &TargetConfig) -> Self {
        TargetZone::new(
            config.center,
            config.radius,
            config.landing_tolerance,
            config.contact_height,
        )
    }

    /// Euclidean distance from the zone center, divided by `scale`.
    pub fn normalized_distance(&self, point: Vector2<f64>, scale: f64) -> f64 {
        (point - self.center).norm() / scale
    }

    pub fn in_contact(&self, y: f64) -> bool {
        y <= self.contact_height
    }
}

impl Default for TargetZone {
    fn default() -> Self {
        TargetZone::from_config(&TargetConfig::default())
    }
}
