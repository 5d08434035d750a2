use crate::tensors::{Logps, ValuesPred};
use candle_core::{Result, Tensor};
use std::ops::{Deref, DerefMut};

/// A single environment step as seen by the learner. `logp` and `value` are rank 0 tensors that
/// still reference the forward pass that produced them.
#[derive(Debug, Clone)]
pub struct Transition {
    pub logp: Tensor,
    pub value: Tensor,
    pub reward: f32,
}

#[derive(Debug, Default)]
pub struct Trajectory {
    transitions: Vec<Transition>,
}

impl Trajectory {
    pub fn push_step(&mut self, logp: Tensor, value: Tensor, reward: f32) {
        self.transitions.push(Transition {
            logp,
            value,
            reward,
        });
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn rewards(&self) -> Vec<f32> {
        self.transitions.iter().map(|t| t.reward).collect()
    }

    pub fn logps(&self) -> Result<Logps> {
        let logps: Vec<&Tensor> = self.transitions.iter().map(|t| &t.logp).collect();
        Ok(Logps(Tensor::stack(&logps, 0)?))
    }

    pub fn values(&self) -> Result<ValuesPred> {
        let values: Vec<&Tensor> = self.transitions.iter().map(|t| &t.value).collect();
        Ok(ValuesPred(Tensor::stack(&values, 0)?))
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    /// Opens a recording scope over this buffer. Everything pushed through the returned guard,
    /// together with the computation graph it keeps alive, is dropped when the guard goes out of
    /// scope.
    pub fn record(&mut self) -> Recording<'_> {
        self.clear();
        Recording { trajectory: self }
    }
}

pub struct Recording<'a> {
    trajectory: &'a mut Trajectory,
}

impl Deref for Recording<'_> {
    type Target = Trajectory;

    fn deref(&self) -> &Self::Target {
        self.trajectory
    }
}

impl DerefMut for Recording<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.trajectory
    }
}

impl Drop for Recording<'_> {
    fn drop(&mut self) {
        self.trajectory.clear();
    }
}
