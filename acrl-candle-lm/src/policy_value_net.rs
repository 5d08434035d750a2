use crate::{optimizer::OptimizerWithMaxGrad, sequential::build_sequential};
use acrl_core::policies::PolicyValueModel;
use candle_core::{DType, Device, Module, Result, Tensor};
use candle_nn::{Linear, Sequential, VarBuilder, VarMap, linear, ops::softmax};
use tracing::debug;

/// Actor and critic sharing a ReLU trunk. The actor head is a softmax over the actions, the
/// critic head a single linear unit.
pub struct PolicyValueNet {
    trunk: Sequential,
    policy_head: Linear,
    value_head: Linear,
    optimizer: OptimizerWithMaxGrad,
    device: Device,
}

impl PolicyValueNet {
    pub fn build(
        observation_size: usize,
        action_size: usize,
        hidden_layers: &[usize],
        learning_rate: f64,
        max_grad_norm: Option<f32>,
        device: &Device,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let (trunk, trunk_dim) = build_sequential(observation_size, hidden_layers, &vb, "trunk")?;
        let policy_head = linear(trunk_dim, action_size, vb.pp("policy_head"))?;
        let value_head = linear(trunk_dim, 1, vb.pp("value_head"))?;
        let optimizer = OptimizerWithMaxGrad::adam(varmap, learning_rate, max_grad_norm)?;
        debug!(
            observation_size,
            action_size,
            ?hidden_layers,
            learning_rate,
            "built policy value network"
        );
        Ok(Self {
            trunk,
            policy_head,
            value_head,
            optimizer,
            device: device.clone(),
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    /// Batched forward pass: `[batch, obs]` to action probabilities `[batch, actions]` and
    /// values `[batch]`.
    pub fn forward_batch(&self, states: &Tensor) -> Result<(Tensor, Tensor)> {
        let hidden = self.trunk.forward(states)?;
        let probs = softmax(&self.policy_head.forward(&hidden)?, 1)?;
        let values = self.value_head.forward(&hidden)?.squeeze(1)?;
        Ok((probs, values))
    }
}

impl PolicyValueModel for PolicyValueNet {
    fn forward(&self, state: &Tensor) -> Result<(Tensor, Tensor)> {
        let state = state.to_device(&self.device)?.unsqueeze(0)?;
        let (probs, values) = self.forward_batch(&state)?;
        Ok((probs.squeeze(0)?, values.squeeze(0)?))
    }

    fn update(&mut self, loss: &Tensor) -> Result<()> {
        self.optimizer.backward_step(loss)
    }
}
