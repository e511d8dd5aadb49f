use numpy::{PyArray1, PyArrayMethods};
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyTuple};
use pyo3::IntoPyObjectExt;

use crate::config::DroneEnvironmentConfig;
use crate::error::EnvError;
use crate::observation_info_utils::{OBSERVATION_HIGH, OBSERVATION_LOW};
use crate::render::{RenderMode, RENDER_FPS, RENDER_MODES};
use crate::{Action, DroneEnvironment, ResetOptions};

impl From<EnvError> for PyErr {
    fn from(err: EnvError) -> PyErr {
        match err {
            EnvError::InvalidAction(_) | EnvError::InvalidConfig(_) => {
                PyValueError::new_err(err.to_string())
            }
            EnvError::Io(_) | EnvError::Yaml(_) | EnvError::Image(_) => {
                PyIOError::new_err(err.to_string())
            }
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn parse_render_mode(render_mode: Option<&str>) -> PyResult<Option<RenderMode>> {
    match render_mode {
        None => Ok(None),
        Some("human") => Ok(Some(RenderMode::Human)),
        Some("rgb_array") => Ok(Some(RenderMode::RgbArray)),
        Some(other) => Err(PyValueError::new_err(format!(
            "unknown render_mode '{}', expected 'human' or 'rgb_array'",
            other
        ))),
    }
}

#[pyclass(unsendable)]
struct DroneEnvironmentWrapper {
    drone_environment: DroneEnvironment,
}

#[pymethods]
impl DroneEnvironmentWrapper {
    #[new]
    #[pyo3(signature = (render_mode=None, max_steps=Some(1000), strict_actions=true))]
    fn new(render_mode: Option<&str>, max_steps: Option<u32>, strict_actions: bool) -> PyResult<Self> {
        let mut config = DroneEnvironmentConfig::default();
        config.episode.render_mode = parse_render_mode(render_mode)?;
        config.episode.max_steps = max_steps;
        config.episode.strict_actions = strict_actions;

        Ok(DroneEnvironmentWrapper {
            drone_environment: DroneEnvironment::new(config)?,
        })
    }

    #[classmethod]
    fn from_yaml_config(
        _cls: &Bound<'_, pyo3::types::PyType>,
        config_path: String,
    ) -> PyResult<Self> {
        let drone_environment = DroneEnvironment::from_yaml_config(config_path)?;
        Ok(DroneEnvironmentWrapper { drone_environment })
    }

    /// Returns `(observation, info)`. `options` may carry `start_position: (x, y)`.
    #[pyo3(signature = (seed=None, options=None))]
    fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<Py<PyTuple>> {
        let mut reset_options = ResetOptions::default();
        if let Some(options) = options {
            if let Some(position) = options.get_item("start_position")? {
                reset_options.start_position = Some(position.extract::<(f64, f64)>()?);
            }
        }

        let (observation, info) = self.drone_environment.reset(seed, Some(reset_options));

        Python::with_gil(|py| {
            let observation = observation.to_numpy(py).into_py_any(py)?;
            let info = info.to_py_dict(py)?.into_py_any(py)?;
            let result = PyTuple::new(py, &[observation, info])?;
            Ok(result.unbind())
        })
    }

    /// Returns `(observation, reward, terminated, truncated, info)`.
    fn step(&mut self, action: i64) -> PyResult<Py<PyTuple>> {
        let result = self.drone_environment.step_raw(action)?;

        Python::with_gil(|py| {
            let observation = result.observation.to_numpy(py).into_py_any(py)?;
            let reward = result.reward.into_py_any(py)?;
            let terminated = result.terminated.into_py_any(py)?;
            let truncated = result.truncated.into_py_any(py)?;
            let info = result.info.to_py_dict(py)?.into_py_any(py)?;

            let result = PyTuple::new(py, &[observation, reward, terminated, truncated, info])?;
            Ok(result.unbind())
        })
    }

    /// RGB array of shape `(height, width, 3)` in rgb_array mode, otherwise `None`.
    fn render(&mut self) -> PyResult<Option<Py<PyAny>>> {
        let Some(frame) = self.drone_environment.render()? else {
            return Ok(None);
        };

        Python::with_gil(|py| {
            let array = PyArray1::from_vec(py, frame.pixels)
                .reshape([frame.height, frame.width, 3])?;
            Ok(Some(array.into_py_any(py)?))
        })
    }

    fn close(&mut self) {
        self.drone_environment.close();
    }

    /// Observations are already returned in numpy format
    fn get_observation(&self) -> PyResult<Py<PyAny>> {
        Python::with_gil(|py| self.drone_environment.observation().to_numpy(py).into_py_any(py))
    }

    /// Size of the discrete action space.
    #[getter]
    fn action_space_n(&self) -> usize {
        Action::COUNT
    }

    /// Lower corner of the observation box.
    #[getter]
    fn observation_low<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice(py, &OBSERVATION_LOW)
    }

    /// Upper corner of the observation box.
    #[getter]
    fn observation_high<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice(py, &OBSERVATION_HIGH)
    }

    #[getter]
    fn render_modes(&self) -> Vec<&'static str> {
        RENDER_MODES.to_vec()
    }

    #[getter]
    fn render_fps(&self) -> u32 {
        RENDER_FPS
    }

    fn get_drone_position(&self) -> (f64, f64) {
        self.drone_environment.get_drone_position()
    }

    fn get_step_count(&self) -> u64 {
        self.drone_environment.step_count()
    }

    fn get_done(&self) -> bool {
        self.drone_environment.get_done()
    }
}

// Python module definition
#[pymodule]
#[pyo3(name = "_lib")]
fn drone_landing_env(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<DroneEnvironmentWrapper>()?;
    Ok(())
}
