use crate::error::EnvError;
use acrl_core::env::{Env, EnvironmentDescription, SnapShot, Space};
use candle_core::{Device, Result, Tensor};
use pyo3::{
    PyObject, PyResult, Python,
    types::{PyAnyMethods, PyDict},
};
use tracing::debug;

/// Bridge to a gymnasium environment with a discrete action space.
pub struct GymEnv {
    env: PyObject,
    action_space: Space,
    observation_space: Space,
    device: Device,
}

impl GymEnv {
    pub fn new(name: &str, render_mode: Option<String>, device: &Device) -> Result<GymEnv> {
        let (env, action_space, observation_space) = Python::with_gil(|py| {
            let gym = py.import("gymnasium")?;
            let kwargs = PyDict::new(py);
            if let Some(render_mode) = render_mode {
                kwargs.set_item("render_mode", render_mode)?;
            }
            let make = gym.getattr("make")?;
            let env = make.call((name,), Some(&kwargs))?;
            let gym_spaces = py.import("gymnasium.spaces")?;
            let action_space = env.getattr("action_space")?;
            let action_space = if action_space.is_instance(&gym_spaces.getattr("Discrete")?)? {
                Some(Space::Discrete(action_space.getattr("n")?.extract()?))
            } else {
                None
            };
            let observation_space = env.getattr("observation_space")?;
            let observation_dims: Vec<usize> = observation_space.getattr("shape")?.extract()?;
            let observation_space = Space::continuous_from_dims(&observation_dims);
            PyResult::Ok((env.unbind(), action_space, observation_space))
        })
        .map_err(EnvError::from)?;
        let Some(action_space) = action_space else {
            return Err(EnvError::UnsupportedSpace(format!(
                "{name} does not have a discrete action space"
            ))
            .into());
        };
        debug!(name, ?action_space, ?observation_space, "created gymnasium env");
        Ok(GymEnv {
            env,
            action_space,
            observation_space,
            device: device.clone(),
        })
    }

    fn to_tensor(&self, state: Vec<f32>) -> Result<Tensor> {
        let len = state.len();
        Tensor::from_vec(state, len, &self.device)
    }
}

impl Env for GymEnv {
    fn reset(&mut self, seed: u64) -> Result<Tensor> {
        let state: Vec<f32> = Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("seed", seed)?;
            let state = self.env.call_method(py, "reset", (), Some(&kwargs))?;
            state.bind(py).get_item(0)?.extract()
        })
        .map_err(EnvError::from)?;
        self.to_tensor(state)
    }

    fn step(&mut self, action: usize) -> Result<SnapShot> {
        let size = self.action_space.size();
        if action >= size {
            return Err(EnvError::InvalidAction { action, size }.into());
        }
        let (state, reward, terminated, truncated) = Python::with_gil(|py| {
            let step = self.env.call_method(py, "step", (action,), None)?;
            let step = step.bind(py);
            let state: Vec<f32> = step.get_item(0)?.extract()?;
            let reward: f32 = step.get_item(1)?.extract()?;
            let terminated: bool = step.get_item(2)?.extract()?;
            let truncated: bool = step.get_item(3)?.extract()?;
            PyResult::Ok((state, reward, terminated, truncated))
        })
        .map_err(EnvError::from)?;
        Ok(SnapShot {
            state: self.to_tensor(state)?,
            reward,
            terminated,
            truncated,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(self.observation_space, self.action_space)
    }
}
