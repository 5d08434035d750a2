use acrl_api::{
    builders::{actor_critic::ActorCriticBuilder, env::EnvBuilder},
    utils::evaluator::Evaluator,
};
use acrl_core::{
    Algorithm,
    distributions::GreedySampler,
    on_policy_algorithm::{TrainingConfig, TrainingOutcome},
};
use acrl_gym::CartPoleConfig;
use candle_core::Device;
use clap::Parser;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Train an actor-critic agent on CartPole")]
struct Args {
    #[arg(long, default_value_t = TrainingConfig::default().gamma)]
    gamma: f32,
    #[arg(long, default_value_t = TrainingConfig::default().epsilon)]
    epsilon: f32,
    #[arg(long, default_value_t = TrainingConfig::default().max_steps_per_episode)]
    max_steps_per_episode: usize,
    #[arg(long, default_value_t = TrainingConfig::default().running_reward_decay)]
    running_reward_decay: f32,
    #[arg(long, default_value_t = TrainingConfig::default().reward_threshold)]
    reward_threshold: f32,
    #[arg(long, default_value_t = TrainingConfig::default().log_interval)]
    log_interval: usize,
    #[arg(long, default_value_t = TrainingConfig::default().max_episodes)]
    max_episodes: usize,
    #[arg(long, default_value_t = TrainingConfig::default().seed)]
    seed: u64,
    /// Comma separated widths of the shared hidden layers
    #[arg(long, value_delimiter = ',', default_values_t = ActorCriticBuilder::default().hidden_layers)]
    hidden_layers: Vec<usize>,
    #[arg(long, default_value_t = ActorCriticBuilder::default().learning_rate)]
    learning_rate: f64,
    /// Clip the global gradient norm to this value
    #[arg(long)]
    max_grad_norm: Option<f32>,
    /// Truncation limit of the native CartPole
    #[arg(long, default_value_t = CartPoleConfig::default().max_episode_steps)]
    max_episode_steps: usize,
    /// Greedy episodes played after training, 0 to skip
    #[arg(long, default_value_t = 10)]
    eval_episodes: usize,
    /// Train on a gymnasium environment instead of the native CartPole
    #[cfg(feature = "python")]
    #[arg(long)]
    gym: Option<String>,
}

impl Args {
    fn env_builder(&self) -> EnvBuilder {
        #[cfg(feature = "python")]
        if let Some(name) = &self.gym {
            return EnvBuilder::Gym { name: name.clone() };
        }
        EnvBuilder::CartPole(CartPoleConfig {
            max_episode_steps: self.max_episode_steps,
            ..CartPoleConfig::default()
        })
    }

    fn builder(&self) -> ActorCriticBuilder {
        ActorCriticBuilder {
            env_builder: self.env_builder(),
            hidden_layers: self.hidden_layers.clone(),
            learning_rate: self.learning_rate,
            max_grad_norm: self.max_grad_norm,
            training_config: TrainingConfig {
                gamma: self.gamma,
                epsilon: self.epsilon,
                max_steps_per_episode: self.max_steps_per_episode,
                running_reward_decay: self.running_reward_decay,
                reward_threshold: self.reward_threshold,
                log_interval: self.log_interval,
                max_episodes: self.max_episodes,
                seed: self.seed,
            },
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let builder = args.builder();
    let device = Device::cuda_if_available(0)?;
    let mut a2c = builder.build(&device)?;
    let outcome = a2c.train()?;
    let (episodes, running_reward) = (outcome.episodes(), outcome.running_reward());
    match outcome {
        TrainingOutcome::Solved { .. } => info!(episodes, running_reward, "training solved"),
        TrainingOutcome::MaxEpisodesExceeded { .. } => {
            warn!(episodes, running_reward, "did not converge")
        }
        TrainingOutcome::Interrupted { .. } => {
            warn!(episodes, running_reward, "training interrupted")
        }
    }

    if args.eval_episodes > 0 {
        let env = builder.env_builder.build(&device)?;
        let mut evaluator = Evaluator::new(
            env,
            args.eval_episodes,
            args.max_steps_per_episode,
            args.seed.wrapping_add(2),
        );
        let result = evaluator.evaluate(&a2c.model, &mut GreedySampler)?;
        println!(
            "evaluation over {} episodes: mean reward {:.2}",
            result.episode_rewards.len(),
            result.mean_reward()
        );
    }

    Ok(if outcome.is_solved() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
