use crate::builders::env::{EnvBuilder, EnvKind};
use acrl_candle_lm::policy_value_net::PolicyValueNet;
use acrl_core::{
    distributions::CategoricalSampler,
    env::{Env, Space},
    on_policy_algorithm::{ActorCritic, DefaultActorCriticHooks, TrainingConfig},
};
use candle_core::{Device, Result, bail};
use tracing::info;

pub type CandleActorCritic<E> =
    ActorCritic<E, PolicyValueNet, CategoricalSampler, DefaultActorCriticHooks>;

pub struct ActorCriticBuilder {
    pub env_builder: EnvBuilder,
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    pub max_grad_norm: Option<f32>,
    pub training_config: TrainingConfig,
}

impl Default for ActorCriticBuilder {
    fn default() -> Self {
        ActorCriticBuilder {
            env_builder: EnvBuilder::default(),
            hidden_layers: vec![128],
            learning_rate: 0.01,
            max_grad_norm: None,
            training_config: TrainingConfig::default(),
        }
    }
}

impl ActorCriticBuilder {
    pub fn cart_pole() -> Self {
        Self::default()
    }

    #[cfg(feature = "python")]
    pub fn gym(name: String) -> Self {
        Self {
            env_builder: EnvBuilder::Gym { name },
            ..Self::default()
        }
    }

    pub fn set_training_config(&mut self, training_config: TrainingConfig) {
        self.training_config = training_config;
    }

    pub fn build(&self, device: &Device) -> Result<CandleActorCritic<EnvKind>> {
        let env = self.env_builder.build(device)?;
        self.build_with_env(env, device)
    }

    pub fn build_with_env<E: Env>(&self, env: E, device: &Device) -> Result<CandleActorCritic<E>> {
        let env_description = env.env_description();
        let Space::Discrete(action_size) = env_description.action_space else {
            bail!(
                "actor-critic needs a discrete action space, got {:?}",
                env_description.action_space
            )
        };
        let model = PolicyValueNet::build(
            env_description.observation_size(),
            action_size,
            &self.hidden_layers,
            self.learning_rate,
            self.max_grad_norm,
            device,
        )?;
        let sampler = CategoricalSampler::new(self.training_config.seed.wrapping_add(1));
        let hooks = DefaultActorCriticHooks::new(self.training_config.log_interval);
        info!(
            observation_size = env_description.observation_size(),
            action_size,
            hidden_layers = ?self.hidden_layers,
            learning_rate = self.learning_rate,
            seed = self.training_config.seed,
            "building actor-critic trainer"
        );
        ActorCritic::new(env, model, sampler, hooks, self.training_config.clone())
    }
}
