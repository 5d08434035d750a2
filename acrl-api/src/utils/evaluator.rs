use acrl_core::{
    distributions::ActionSampler, env::Env, policies::PolicyValueModel, rollout::run_episode,
    utils::trajectory::Trajectory,
};
use candle_core::Result;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub episode_rewards: Vec<f32>,
}

impl EvaluationResult {
    pub fn mean_reward(&self) -> f32 {
        if self.episode_rewards.is_empty() {
            return 0.;
        }
        self.episode_rewards.iter().sum::<f32>() / self.episode_rewards.len() as f32
    }
}

/// Plays episodes with a model without updating it.
pub struct Evaluator<E: Env> {
    pub env: E,
    pub eval_episodes: usize,
    pub max_steps: usize,
    seed_rng: StdRng,
    trajectory: Trajectory,
}

impl<E: Env> Evaluator<E> {
    pub fn new(env: E, eval_episodes: usize, max_steps: usize, seed: u64) -> Self {
        Self {
            env,
            eval_episodes,
            max_steps,
            seed_rng: StdRng::seed_from_u64(seed),
            trajectory: Trajectory::default(),
        }
    }

    pub fn evaluate<M, S>(&mut self, model: &M, sampler: &mut S) -> Result<EvaluationResult>
    where
        M: PolicyValueModel,
        S: ActionSampler,
    {
        let mut episode_rewards = Vec::with_capacity(self.eval_episodes);
        for _ in 0..self.eval_episodes {
            let seed = self.seed_rng.random::<u64>();
            let mut recording = self.trajectory.record();
            let stats = run_episode(
                &mut self.env,
                model,
                sampler,
                &mut recording,
                seed,
                self.max_steps,
            )?;
            episode_rewards.push(stats.total_reward);
        }
        let result = EvaluationResult { episode_rewards };
        info!(
            episodes = self.eval_episodes,
            mean_reward = result.mean_reward(),
            "evaluation finished"
        );
        Ok(result)
    }
}
