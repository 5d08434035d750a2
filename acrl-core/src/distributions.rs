use candle_core::{Error, Result, Tensor};
use rand::distr::Distribution as RandDistribution;
use rand::distr::weighted::WeightedIndex;
use rand::{SeedableRng, rngs::StdRng};

pub trait ActionSampler {
    /// Draws an action index from a rank 1 tensor of action probabilities.
    fn sample(&mut self, probs: &Tensor) -> Result<usize>;
}

/// Samples proportionally to the given probabilities.
#[derive(Debug, Clone)]
pub struct CategoricalSampler {
    rng: StdRng,
}

impl CategoricalSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ActionSampler for CategoricalSampler {
    fn sample(&mut self, probs: &Tensor) -> Result<usize> {
        let action_probs: Vec<f32> = probs.to_vec1()?;
        let distribution = WeightedIndex::new(&action_probs).map_err(Error::wrap)?;
        Ok(distribution.sample(&mut self.rng))
    }
}

/// Always picks the most likely action.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySampler;

impl ActionSampler for GreedySampler {
    fn sample(&mut self, probs: &Tensor) -> Result<usize> {
        let action = probs.argmax(0)?.to_scalar::<u32>()?;
        Ok(action as usize)
    }
}
