use std::f64::consts::PI;

use nalgebra::Vector2;

use crate::actors::TargetZone;
use crate::physics::BodyState;

#[cfg(feature = "python")]
use numpy::PyArray1;
#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyDict;

pub const OBSERVATION_SIZE: usize = 7;

// Box bounds advertised as the observation space, same order as `Observation::to_array`.
pub const OBSERVATION_LOW: [f64; OBSERVATION_SIZE] = [0.0, 0.0, -1000.0, -1000.0, -PI, -10.0, 0.0];
pub const OBSERVATION_HIGH: [f64; OBSERVATION_SIZE] = [800.0, 600.0, 1000.0, 1000.0, PI, 10.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub angle: f64,
    pub angular_velocity: f64,
    pub ground_contact: f64, // 1.0 at or below the zone's contact height, else 0.0
}

impl Observation {
    pub fn from_state(state: &BodyState, target: &TargetZone) -> Self {
        Observation {
            x: state.position.x,
            y: state.position.y,
            vx: state.velocity.x,
            vy: state.velocity.y,
            angle: state.angle,
            angular_velocity: state.angular_velocity,
            ground_contact: if target.in_contact(state.position.y) {
                1.0
            } else {
                0.0
            },
        }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn in_contact(&self) -> bool {
        self.ground_contact >= 0.5
    }

    pub fn to_array(&self) -> [f64; OBSERVATION_SIZE] {
        [
            self.x,
            self.y,
            self.vx,
            self.vy,
            self.angle,
            self.angular_velocity,
            self.ground_contact,
        ]
    }

    // Flat numpy array of shape [7], same order as `to_array`
    #[cfg(feature = "python")]
    pub fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice(py, &self.to_array())
    }
}

/// Per-step diagnostics. Intentionally carries nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Information;

impl Information {
    #[cfg(feature = "python")]
    pub fn to_py_dict(&self, py: Python) -> PyResult<Py<PyDict>> {
        let dict = PyDict::new(py);
        Ok(dict.unbind())
    }
}
