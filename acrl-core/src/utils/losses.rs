use crate::{
    error::TrainingError,
    tensors::{Advantages, PolicyLoss, Returns, ValueLoss},
    utils::trajectory::Trajectory,
};
use candle_core::{Result, Tensor};

pub const HUBER_DELTA: f32 = 1.;

/// Element-wise Huber loss: quadratic inside `delta`, linear outside.
pub fn huber_loss(predictions: &Tensor, targets: &Tensor, delta: f32) -> Result<Tensor> {
    let abs_error = predictions.sub(targets)?.abs()?;
    let delta_t = Tensor::full(delta, abs_error.dims(), abs_error.device())?;
    let quadratic = abs_error.minimum(&delta_t)?;
    let linear = abs_error.sub(&quadratic)?;
    quadratic
        .sqr()?
        .affine(0.5, 0.)?
        .add(&linear.affine(delta as f64, 0.)?)
}

/// Builds the summed actor and critic losses for one episode.
///
/// The actor term for each step is `-logp * (G - V)`, the critic term is the Huber loss between
/// `V` and `G`. The advantage is computed against a detached copy of the value estimate, so the
/// critic only receives gradients from its own regression term.
pub fn compute_losses(trajectory: &Trajectory, returns: &[f32]) -> Result<(PolicyLoss, ValueLoss)> {
    if trajectory.is_empty() {
        return Err(TrainingError::EmptyTrajectory.into());
    }
    if trajectory.len() != returns.len() {
        return Err(TrainingError::LengthMismatch {
            transitions: trajectory.len(),
            returns: returns.len(),
        }
        .into());
    }
    let logps = trajectory.logps()?;
    let values = trajectory.values()?;
    let returns = Returns(Tensor::from_slice(returns, returns.len(), values.device())?);
    let advantages = Advantages(returns.sub(&values.detach())?);
    let policy_loss = PolicyLoss(logps.mul(&advantages)?.neg()?.sum_all()?);
    let value_loss = ValueLoss(huber_loss(&values, &returns, HUBER_DELTA)?.sum_all()?);
    Ok((policy_loss, value_loss))
}
