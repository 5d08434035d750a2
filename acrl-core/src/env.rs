use candle_core::{Result, Tensor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    Discrete(usize),
    Continuous { size: usize },
}

impl Space {
    pub fn continuous_from_dims(dims: &[usize]) -> Self {
        Self::Continuous {
            size: dims.iter().product(),
        }
    }

    pub fn size(&self) -> usize {
        match &self {
            Self::Discrete(size) => *size,
            Self::Continuous { size } => *size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentDescription {
    pub observation_space: Space,
    pub action_space: Space,
}

impl EnvironmentDescription {
    pub fn new(observation_space: Space, action_space: Space) -> Self {
        Self {
            observation_space,
            action_space,
        }
    }

    pub fn action_size(&self) -> usize {
        self.action_space.size()
    }

    pub fn observation_size(&self) -> usize {
        self.observation_space.size()
    }
}

/// What the environment hands back after a single step.
#[derive(Debug, Clone)]
pub struct SnapShot {
    pub state: Tensor,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
}

impl SnapShot {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// A discrete-action environment. States are flat rank 1 tensors.
pub trait Env {
    /// Starts a new episode. The same seed must yield the same initial state.
    fn reset(&mut self, seed: u64) -> Result<Tensor>;

    fn step(&mut self, action: usize) -> Result<SnapShot>;

    fn env_description(&self) -> EnvironmentDescription;
}
