//! Classic cart-pole balancing task.
//!
//! A pole is hinged to a cart moving along a frictionless track. Action `0` pushes the cart to the
//! left, action `1` to the right. The observation is `[x, x_dot, theta, theta_dot]` and every step
//! yields a reward of `1`. The episode terminates once the pole leans more than 12 degrees or the
//! cart leaves the track, and is truncated after `max_episode_steps`.

use crate::error::EnvError;
use acrl_core::env::{Env, EnvironmentDescription, SnapShot, Space};
use candle_core::{Device, Result, Tensor};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f32::consts::PI;
use tracing::trace;

const OBSERVATION_SIZE: usize = 4;
const ACTION_SIZE: usize = 2;

#[derive(Debug, Clone)]
pub struct CartPoleConfig {
    pub gravity: f32,
    pub mass_cart: f32,
    pub mass_pole: f32,
    /// Half of the pole's length
    pub length: f32,
    pub force_mag: f32,
    /// Integration timestep in seconds
    pub tau: f32,
    pub theta_threshold: f32,
    pub x_threshold: f32,
    pub max_episode_steps: usize,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.,
            mass_pole: 0.1,
            length: 0.5,
            force_mag: 10.,
            tau: 0.02,
            theta_threshold: 12. * 2. * PI / 360.,
            x_threshold: 2.4,
            max_episode_steps: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NeedsReset,
    Running,
    Finished,
}

pub struct CartPole {
    config: CartPoleConfig,
    state: [f32; OBSERVATION_SIZE],
    steps: usize,
    phase: Phase,
    rng: StdRng,
    device: Device,
}

impl CartPole {
    pub fn new(config: CartPoleConfig, device: &Device) -> Self {
        Self {
            config,
            state: [0.; OBSERVATION_SIZE],
            steps: 0,
            phase: Phase::NeedsReset,
            rng: StdRng::seed_from_u64(0),
            device: device.clone(),
        }
    }

    fn observation(&self) -> Result<Tensor> {
        Tensor::from_slice(&self.state, OBSERVATION_SIZE, &self.device)
    }

    fn is_terminal(&self) -> bool {
        let [x, _, theta, _] = self.state;
        x.abs() > self.config.x_threshold || theta.abs() > self.config.theta_threshold
    }

    fn integrate(&mut self, action: usize) {
        let CartPoleConfig {
            gravity,
            mass_cart,
            mass_pole,
            length,
            force_mag,
            tau,
            ..
        } = self.config;
        let total_mass = mass_cart + mass_pole;
        let pole_mass_length = mass_pole * length;
        let [x, x_dot, theta, theta_dot] = self.state;
        let force = if action == 1 { force_mag } else { -force_mag };
        let (sin_theta, cos_theta) = theta.sin_cos();
        let temp = (force + pole_mass_length * theta_dot * theta_dot * sin_theta) / total_mass;
        let theta_acc = (gravity * sin_theta - cos_theta * temp)
            / (length * (4. / 3. - mass_pole * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;
        self.state = [
            x + tau * x_dot,
            x_dot + tau * x_acc,
            theta + tau * theta_dot,
            theta_dot + tau * theta_acc,
        ];
    }
}

impl Env for CartPole {
    fn reset(&mut self, seed: u64) -> Result<Tensor> {
        self.rng = StdRng::seed_from_u64(seed);
        for value in self.state.iter_mut() {
            *value = self.rng.random_range(-0.05..0.05);
        }
        self.steps = 0;
        self.phase = Phase::Running;
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<SnapShot> {
        if action >= ACTION_SIZE {
            return Err(EnvError::InvalidAction {
                action,
                size: ACTION_SIZE,
            }
            .into());
        }
        if self.phase != Phase::Running {
            return Err(EnvError::EpisodeFinished.into());
        }
        self.integrate(action);
        self.steps += 1;
        let terminated = self.is_terminal();
        let truncated = !terminated && self.steps >= self.config.max_episode_steps;
        if terminated || truncated {
            self.phase = Phase::Finished;
            trace!(steps = self.steps, terminated, "cart pole episode over");
        }
        Ok(SnapShot {
            state: self.observation()?,
            reward: 1.,
            terminated,
            truncated,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(
            Space::Continuous {
                size: OBSERVATION_SIZE,
            },
            Space::Discrete(ACTION_SIZE),
        )
    }
}
