pub mod distributions;
pub mod env;
pub mod error;
pub mod on_policy_algorithm;
pub mod policies;
pub mod rollout;
pub mod tensors;
pub mod utils;

use candle_core::Result;

pub trait Algorithm {
    type Outcome;

    fn train(&mut self) -> Result<Self::Outcome>;
}
