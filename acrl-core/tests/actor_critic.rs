use acrl_core::{
    Algorithm,
    distributions::CategoricalSampler,
    env::{Env, EnvironmentDescription, SnapShot, Space},
    on_policy_algorithm::{
        ActorCritic, ActorCriticHooks, DefaultActorCriticHooks, EpisodeReport, TrainingConfig,
        TrainingOutcome,
    },
    policies::PolicyValueModel,
    rollout::run_episode,
    utils::{returns::discounted_returns, trajectory::Trajectory},
};
use candle_core::{Device, Result, Tensor, bail};

struct FixedLengthEnv {
    episode_len: usize,
    reward: f32,
    fail_at: Option<usize>,
    t: usize,
    seeds: Vec<u64>,
}

impl FixedLengthEnv {
    fn new(episode_len: usize, reward: f32) -> Self {
        Self {
            episode_len,
            reward,
            fail_at: None,
            t: 0,
            seeds: vec![],
        }
    }

    fn state(&self) -> Result<Tensor> {
        Tensor::full(self.t as f32, 4, &Device::Cpu)
    }
}

impl Env for FixedLengthEnv {
    fn reset(&mut self, seed: u64) -> Result<Tensor> {
        self.t = 0;
        self.seeds.push(seed);
        self.state()
    }

    fn step(&mut self, action: usize) -> Result<SnapShot> {
        if action > 1 {
            bail!("invalid action {action}")
        }
        self.t += 1;
        if self.fail_at == Some(self.t) {
            bail!("simulator crashed at step {}", self.t)
        }
        Ok(SnapShot {
            state: self.state()?,
            reward: self.reward,
            terminated: self.t >= self.episode_len,
            truncated: false,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(Space::Continuous { size: 4 }, Space::Discrete(2))
    }
}

#[derive(Default)]
struct UniformModel {
    losses: Vec<f32>,
}

impl PolicyValueModel for UniformModel {
    fn forward(&self, state: &Tensor) -> Result<(Tensor, Tensor)> {
        assert_eq!(state.dims(), &[4]);
        let probs = Tensor::new(&[0.5f32, 0.5], &Device::Cpu)?;
        let value = Tensor::new(0f32, &Device::Cpu)?;
        Ok((probs, value))
    }

    fn update(&mut self, loss: &Tensor) -> Result<()> {
        self.losses.push(loss.to_scalar::<f32>()?);
        Ok(())
    }
}

#[derive(Default)]
struct QuietHooks {
    reports: Vec<EpisodeReport>,
    solved: Option<usize>,
    stop_after: Option<usize>,
}

impl ActorCriticHooks for QuietHooks {
    fn post_episode_hook(&mut self, report: &EpisodeReport) -> bool {
        self.reports.push(*report);
        self.stop_after.is_some_and(|n| report.episode >= n)
    }

    fn solved_hook(&mut self, report: &EpisodeReport) {
        self.solved = Some(report.episode);
    }
}

struct RejectingModel;

impl PolicyValueModel for RejectingModel {
    fn forward(&self, state: &Tensor) -> Result<(Tensor, Tensor)> {
        UniformModel::default().forward(state)
    }

    fn update(&mut self, _loss: &Tensor) -> Result<()> {
        bail!("optimizer step failed")
    }
}

fn trainer_with<M: PolicyValueModel, H: ActorCriticHooks>(
    env: FixedLengthEnv,
    model: M,
    hooks: H,
    config: TrainingConfig,
) -> Result<ActorCritic<FixedLengthEnv, M, CategoricalSampler, H>> {
    let sampler = CategoricalSampler::new(config.seed);
    ActorCritic::new(env, model, sampler, hooks, config)
}

fn trainer(
    env: FixedLengthEnv,
    config: TrainingConfig,
) -> Result<ActorCritic<FixedLengthEnv, UniformModel, CategoricalSampler, QuietHooks>> {
    trainer_with(env, UniformModel::default(), QuietHooks::default(), config)
}

fn printed_lines(hooks: &DefaultActorCriticHooks<Vec<u8>>) -> Vec<String> {
    String::from_utf8_lossy(hooks.writer())
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn five_step_episode_records_every_step() -> Result<()> {
    let mut env = FixedLengthEnv::new(5, 1.);
    let model = UniformModel::default();
    let mut sampler = CategoricalSampler::new(0);
    let mut trajectory = Trajectory::default();
    let stats = run_episode(&mut env, &model, &mut sampler, &mut trajectory, 1, 100)?;
    assert_eq!(stats.steps, 5);
    assert_eq!(stats.total_reward, 5.);
    assert_eq!(trajectory.len(), 5);
    for transition in trajectory.transitions() {
        let logp = transition.logp.to_scalar::<f32>()?;
        assert!((logp - 0.5f32.ln()).abs() < 1e-6);
    }
    let returns = discounted_returns(&trajectory.rewards(), 0.99);
    let expected = [4.90, 3.94, 2.97, 1.99, 1.0];
    for (got, want) in returns.iter().zip(expected) {
        assert!((got - want).abs() < 5e-3, "{got} vs {want}");
    }
    Ok(())
}

#[test]
fn episode_stops_at_step_cap() -> Result<()> {
    let mut env = FixedLengthEnv::new(usize::MAX, 1.);
    let mut trajectory = Trajectory::default();
    let stats = run_episode(
        &mut env,
        &UniformModel::default(),
        &mut CategoricalSampler::new(0),
        &mut trajectory,
        1,
        7,
    )?;
    assert_eq!(stats.steps, 7);
    assert_eq!(trajectory.len(), 7);
    Ok(())
}

#[test]
fn solves_when_every_episode_scores_high() -> Result<()> {
    let mut a2c = trainer(FixedLengthEnv::new(1, 200.), TrainingConfig::default())?;
    let outcome = a2c.train()?;
    let TrainingOutcome::Solved {
        episode,
        running_reward,
    } = outcome
    else {
        panic!("expected to solve, got {outcome:?}");
    };
    assert!((70..=75).contains(&episode), "solved at {episode}");
    assert!(running_reward > 195.);
    assert_eq!(a2c.hooks.solved, Some(episode));
    assert_eq!(a2c.model.losses.len(), episode);
    assert_eq!(a2c.pending_transitions(), 0);
    Ok(())
}

#[test]
fn stops_at_episode_cap() -> Result<()> {
    let config = TrainingConfig {
        max_episodes: 5,
        ..TrainingConfig::default()
    };
    let mut a2c = trainer(FixedLengthEnv::new(10, 1.), config)?;
    let outcome = a2c.train()?;
    assert_eq!(
        outcome,
        TrainingOutcome::MaxEpisodesExceeded {
            episodes: 5,
            running_reward: a2c.running_reward(),
        }
    );
    assert!(!outcome.is_solved());
    assert_eq!(a2c.hooks.reports.len(), 5);
    assert!(a2c.hooks.solved.is_none());
    let episodes: Vec<usize> = a2c.hooks.reports.iter().map(|r| r.episode).collect();
    assert_eq!(episodes, vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[test]
fn hook_can_interrupt_training() -> Result<()> {
    let mut a2c = trainer(FixedLengthEnv::new(3, 1.), TrainingConfig::default())?;
    a2c.hooks.stop_after = Some(3);
    let outcome = a2c.train()?;
    assert!(matches!(
        outcome,
        TrainingOutcome::Interrupted { episodes: 3, .. }
    ));
    Ok(())
}

#[test]
fn env_failure_propagates_and_releases_trajectory() -> Result<()> {
    let mut env = FixedLengthEnv::new(10, 1.);
    env.fail_at = Some(4);
    let mut a2c = trainer(env, TrainingConfig::default())?;
    assert!(a2c.train().is_err());
    assert_eq!(a2c.pending_transitions(), 0);
    assert_eq!(a2c.episode(), 0);
    assert!(a2c.model.losses.is_empty());
    Ok(())
}

#[test]
fn running_reward_uses_configured_decay() -> Result<()> {
    let config = TrainingConfig {
        running_reward_decay: 0.5,
        ..TrainingConfig::default()
    };
    let mut a2c = trainer(FixedLengthEnv::new(4, 1.), config)?;
    let first = a2c.train_episode()?;
    assert_eq!(first.episode_reward, 4.);
    assert!((first.running_reward - 2.).abs() < 1e-6);
    let second = a2c.train_episode()?;
    assert!((second.running_reward - 3.).abs() < 1e-6);
    Ok(())
}

#[test]
fn resets_are_seeded() -> Result<()> {
    let mut first = trainer(FixedLengthEnv::new(2, 1.), TrainingConfig::default())?;
    let mut second = trainer(FixedLengthEnv::new(2, 1.), TrainingConfig::default())?;
    for _ in 0..3 {
        first.train_episode()?;
        second.train_episode()?;
    }
    assert_eq!(first.env.seeds, second.env.seeds);
    assert_eq!(first.env.seeds.len(), 3);
    Ok(())
}

#[test]
fn rejects_invalid_config() {
    for config in [
        TrainingConfig {
            gamma: 1.5,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            epsilon: 0.,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            running_reward_decay: 0.,
            ..TrainingConfig::default()
        },
        TrainingConfig {
            max_episodes: 0,
            ..TrainingConfig::default()
        },
    ] {
        assert!(trainer(FixedLengthEnv::new(2, 1.), config).is_err());
    }
}

#[test]
fn failed_update_leaves_trainer_state_untouched() -> Result<()> {
    let mut a2c = trainer_with(
        FixedLengthEnv::new(4, 1.),
        RejectingModel,
        QuietHooks::default(),
        TrainingConfig::default(),
    )?;
    for _ in 0..2 {
        assert!(a2c.train_episode().is_err());
        assert_eq!(a2c.episode(), 0);
        assert_eq!(a2c.running_reward(), 0.);
        assert_eq!(a2c.pending_transitions(), 0);
    }
    assert!(a2c.train().is_err());
    assert_eq!(a2c.running_reward(), 0.);
    Ok(())
}

#[test]
fn default_hooks_print_progress_every_log_interval() -> Result<()> {
    let config = TrainingConfig {
        max_episodes: 20,
        log_interval: 10,
        ..TrainingConfig::default()
    };
    let hooks = DefaultActorCriticHooks::with_writer(config.log_interval, Vec::new());
    let mut a2c = trainer_with(
        FixedLengthEnv::new(3, 1.),
        UniformModel::default(),
        hooks,
        config,
    )?;
    let outcome = a2c.train()?;
    assert!(matches!(
        outcome,
        TrainingOutcome::MaxEpisodesExceeded { episodes: 20, .. }
    ));
    let mut running = 0f32;
    let mut expected = vec![];
    for episode in 1..=20 {
        running = 0.05 * 3. + (1. - 0.05) * running;
        if episode % 10 == 0 {
            expected.push(format!("running reward: {running:.2} at episode {episode}"));
        }
    }
    assert_eq!(printed_lines(&a2c.hooks), expected);
    assert_eq!(expected[0], "running reward: 1.20 at episode 10");
    Ok(())
}

#[test]
fn default_hooks_announce_solved_episode() -> Result<()> {
    let hooks = DefaultActorCriticHooks::with_writer(10, Vec::new());
    let mut a2c = trainer_with(
        FixedLengthEnv::new(1, 200.),
        UniformModel::default(),
        hooks,
        TrainingConfig::default(),
    )?;
    let outcome = a2c.train()?;
    let episode = outcome.episodes();
    assert!(outcome.is_solved());
    let lines = printed_lines(&a2c.hooks);
    assert_eq!(lines.len(), episode / 10 + 1);
    assert!(lines[..lines.len() - 1]
        .iter()
        .all(|line| line.starts_with("running reward: ")));
    assert_eq!(lines.last(), Some(&format!("Solved at episode {episode}!")));
    Ok(())
}

#[test]
fn solving_wins_over_a_stop_request_on_the_same_episode() -> Result<()> {
    let config = TrainingConfig {
        reward_threshold: 5.,
        ..TrainingConfig::default()
    };
    let mut a2c = trainer(FixedLengthEnv::new(1, 200.), config)?;
    a2c.hooks.stop_after = Some(1);
    let outcome = a2c.train()?;
    assert!(matches!(outcome, TrainingOutcome::Solved { episode: 1, .. }));
    assert_eq!(a2c.hooks.solved, Some(1));
    Ok(())
}
