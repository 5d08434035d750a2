use acrl_core::env::{Env, EnvironmentDescription, SnapShot};
use acrl_gym::{CartPole, CartPoleConfig};
#[cfg(feature = "python")]
use acrl_gym::GymEnv;
use candle_core::{Device, Result, Tensor};

#[derive(Debug, Clone)]
pub enum EnvBuilder {
    CartPole(CartPoleConfig),
    #[cfg(feature = "python")]
    Gym { name: String },
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::CartPole(CartPoleConfig::default())
    }
}

impl EnvBuilder {
    pub fn build(&self, device: &Device) -> Result<EnvKind> {
        match self {
            Self::CartPole(config) => Ok(EnvKind::CartPole(CartPole::new(config.clone(), device))),
            #[cfg(feature = "python")]
            Self::Gym { name } => Ok(EnvKind::Gym(GymEnv::new(name, None, device)?)),
        }
    }
}

pub enum EnvKind {
    CartPole(CartPole),
    #[cfg(feature = "python")]
    Gym(GymEnv),
}

impl Env for EnvKind {
    fn reset(&mut self, seed: u64) -> Result<Tensor> {
        match self {
            Self::CartPole(env) => env.reset(seed),
            #[cfg(feature = "python")]
            Self::Gym(env) => env.reset(seed),
        }
    }

    fn step(&mut self, action: usize) -> Result<SnapShot> {
        match self {
            Self::CartPole(env) => env.step(action),
            #[cfg(feature = "python")]
            Self::Gym(env) => env.step(action),
        }
    }

    fn env_description(&self) -> EnvironmentDescription {
        match self {
            Self::CartPole(env) => env.env_description(),
            #[cfg(feature = "python")]
            Self::Gym(env) => env.env_description(),
        }
    }
}
