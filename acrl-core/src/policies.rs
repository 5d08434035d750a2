use candle_core::{Result, Tensor};

/// The differentiable actor-critic model the training loop drives.
pub trait PolicyValueModel {
    /// Takes a rank 1 observation and returns the action probabilities (rank 1, summing to one)
    /// together with the value estimate (rank 0). Both outputs stay attached to the autograd
    /// graph so that a loss built from them can be backpropagated by [`update`].
    ///
    /// [`update`]: PolicyValueModel::update
    fn forward(&self, state: &Tensor) -> Result<(Tensor, Tensor)>;

    /// Backpropagates `loss` and applies a single optimizer step to the parameters.
    fn update(&mut self, loss: &Tensor) -> Result<()>;
}
