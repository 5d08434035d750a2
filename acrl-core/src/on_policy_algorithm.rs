use crate::{
    Algorithm,
    distributions::ActionSampler,
    env::Env,
    error::TrainingError,
    policies::PolicyValueModel,
    rollout::run_episode,
    utils::{
        losses::compute_losses, returns::compute_returns, running_reward::RunningReward,
        trajectory::Trajectory,
    },
};
use candle_core::Result;
use std::io::{Stdout, Write};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

macro_rules! break_on_hook_res {
    ($hook_res:expr) => {
        if $hook_res {
            break;
        }
    };
}

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Discount factor
    pub gamma: f32,
    /// Added to the standard deviation when normalizing returns
    pub epsilon: f32,
    pub max_steps_per_episode: usize,
    /// Weight of the newest episode in the running reward
    pub running_reward_decay: f32,
    /// Training counts as solved once the running reward is strictly above this
    pub reward_threshold: f32,
    pub log_interval: usize,
    pub max_episodes: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            epsilon: f32::EPSILON,
            max_steps_per_episode: 10_000,
            running_reward_decay: 0.05,
            reward_threshold: 195.,
            log_interval: 10,
            max_episodes: 10_000,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> std::result::Result<(), TrainingError> {
        let invalid = |msg: String| Err(TrainingError::InvalidConfig(msg));
        if !(0. ..=1.).contains(&self.gamma) {
            return invalid(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        if !(self.epsilon > 0.) {
            return invalid(format!("epsilon must be positive, got {}", self.epsilon));
        }
        if !(self.running_reward_decay > 0. && self.running_reward_decay <= 1.) {
            return invalid(format!(
                "running reward decay must be in (0, 1], got {}",
                self.running_reward_decay
            ));
        }
        if self.max_steps_per_episode == 0 {
            return invalid("max steps per episode must be non zero".into());
        }
        if self.max_episodes == 0 {
            return invalid("max episodes must be non zero".into());
        }
        if self.log_interval == 0 {
            return invalid("log interval must be non zero".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainingOutcome {
    Solved {
        episode: usize,
        running_reward: f32,
    },
    MaxEpisodesExceeded {
        episodes: usize,
        running_reward: f32,
    },
    /// A hook asked training to stop.
    Interrupted {
        episodes: usize,
        running_reward: f32,
    },
}

impl TrainingOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }

    pub fn episodes(&self) -> usize {
        match self {
            Self::Solved { episode, .. } => *episode,
            Self::MaxEpisodesExceeded { episodes, .. } | Self::Interrupted { episodes, .. } => {
                *episodes
            }
        }
    }

    pub fn running_reward(&self) -> f32 {
        match self {
            Self::Solved { running_reward, .. }
            | Self::MaxEpisodesExceeded { running_reward, .. }
            | Self::Interrupted { running_reward, .. } => *running_reward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    /// One based index of the episode that just finished
    pub episode: usize,
    pub steps: usize,
    pub episode_reward: f32,
    pub running_reward: f32,
    pub policy_loss: f32,
    pub value_loss: f32,
}

pub trait ActorCriticHooks {
    /// Called after every parameter update. Returning `true` stops training.
    fn post_episode_hook(&mut self, report: &EpisodeReport) -> bool;

    fn solved_hook(&mut self, report: &EpisodeReport);
}

/// Prints progress every `log_interval` episodes and a final line once solved.
pub struct DefaultActorCriticHooks<W: Write = Stdout> {
    log_interval: usize,
    writer: W,
}

impl DefaultActorCriticHooks {
    pub fn new(log_interval: usize) -> Self {
        Self::with_writer(log_interval, std::io::stdout())
    }
}

impl<W: Write> DefaultActorCriticHooks<W> {
    pub fn with_writer(log_interval: usize, writer: W) -> Self {
        Self {
            log_interval,
            writer,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> ActorCriticHooks for DefaultActorCriticHooks<W> {
    fn post_episode_hook(&mut self, report: &EpisodeReport) -> bool {
        if self.log_interval > 0 && report.episode % self.log_interval == 0 {
            if let Err(err) = writeln!(
                self.writer,
                "running reward: {:.2} at episode {}",
                report.running_reward, report.episode
            ) {
                warn!(%err, "failed to write progress");
            }
        }
        false
    }

    fn solved_hook(&mut self, report: &EpisodeReport) {
        if let Err(err) = writeln!(self.writer, "Solved at episode {}!", report.episode) {
            warn!(%err, "failed to write progress");
        }
    }
}

/// Single-environment actor-critic trainer: one rollout and one update per episode.
pub struct ActorCritic<E: Env, M: PolicyValueModel, S: ActionSampler, H: ActorCriticHooks> {
    pub env: E,
    pub model: M,
    pub sampler: S,
    pub hooks: H,
    config: TrainingConfig,
    running_reward: RunningReward,
    episode: usize,
    trajectory: Trajectory,
    seed_rng: StdRng,
}

impl<E, M, S, H> ActorCritic<E, M, S, H>
where
    E: Env,
    M: PolicyValueModel,
    S: ActionSampler,
    H: ActorCriticHooks,
{
    pub fn new(env: E, model: M, sampler: S, hooks: H, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            env,
            model,
            sampler,
            hooks,
            running_reward: RunningReward::new(config.running_reward_decay),
            episode: 0,
            trajectory: Trajectory::default(),
            seed_rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }

    pub fn running_reward(&self) -> f32 {
        self.running_reward.value()
    }

    /// Number of episodes trained so far.
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Transitions currently held in the trajectory buffer. Always zero between episodes.
    pub fn pending_transitions(&self) -> usize {
        self.trajectory.len()
    }

    /// Runs one episode and applies a single gradient step built from it. Trainer state only
    /// advances once the update succeeded.
    pub fn train_episode(&mut self) -> Result<EpisodeReport> {
        let seed = self.seed_rng.random::<u64>();
        let mut recording = self.trajectory.record();
        let stats = run_episode(
            &mut self.env,
            &self.model,
            &mut self.sampler,
            &mut recording,
            seed,
            self.config.max_steps_per_episode,
        )?;
        let mut running = self.running_reward;
        let running_reward = running.update(stats.total_reward);
        let returns = compute_returns(&recording.rewards(), self.config.gamma, self.config.epsilon);
        let (policy_loss, value_loss) = compute_losses(&recording, &returns)?;
        let loss = policy_loss.add(&value_loss)?;
        let policy_loss = policy_loss.to_scalar::<f32>()?;
        let value_loss = value_loss.to_scalar::<f32>()?;
        if !(policy_loss.is_finite() && value_loss.is_finite()) {
            warn!(
                episode = self.episode + 1,
                policy_loss, value_loss, "non finite loss"
            );
        }
        self.model.update(&loss)?;
        drop(recording);
        self.running_reward = running;
        self.episode += 1;
        debug!(
            episode = self.episode,
            steps = stats.steps,
            reward = stats.total_reward,
            running_reward,
            policy_loss,
            value_loss,
            "episode finished"
        );
        Ok(EpisodeReport {
            episode: self.episode,
            steps: stats.steps,
            episode_reward: stats.total_reward,
            running_reward,
            policy_loss,
            value_loss,
        })
    }
}

impl<E, M, S, H> Algorithm for ActorCritic<E, M, S, H>
where
    E: Env,
    M: PolicyValueModel,
    S: ActionSampler,
    H: ActorCriticHooks,
{
    type Outcome = TrainingOutcome;

    fn train(&mut self) -> Result<TrainingOutcome> {
        loop {
            let report = self.train_episode()?;
            let stop = self.hooks.post_episode_hook(&report);
            if self.running_reward.exceeds(self.config.reward_threshold) {
                info!(
                    episode = report.episode,
                    running_reward = report.running_reward,
                    "solved"
                );
                self.hooks.solved_hook(&report);
                return Ok(TrainingOutcome::Solved {
                    episode: report.episode,
                    running_reward: report.running_reward,
                });
            }
            break_on_hook_res!(stop);
            if self.episode >= self.config.max_episodes {
                info!(
                    episodes = self.episode,
                    running_reward = report.running_reward,
                    "episode cap reached before solving"
                );
                return Ok(TrainingOutcome::MaxEpisodesExceeded {
                    episodes: self.episode,
                    running_reward: report.running_reward,
                });
            }
        }
        Ok(TrainingOutcome::Interrupted {
            episodes: self.episode,
            running_reward: self.running_reward.value(),
        })
    }
}
