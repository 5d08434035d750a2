use crate::{
    distributions::ActionSampler,
    env::{Env, SnapShot},
    policies::PolicyValueModel,
    utils::trajectory::Trajectory,
};
use candle_core::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub steps: usize,
    pub total_reward: f32,
}

/// Plays one episode with the current model, appending a transition per step to `trajectory`.
///
/// The episode ends when the environment reports termination or truncation, or after
/// `max_steps` transitions, whichever comes first.
pub fn run_episode<E, M, S>(
    env: &mut E,
    model: &M,
    sampler: &mut S,
    trajectory: &mut Trajectory,
    seed: u64,
    max_steps: usize,
) -> Result<EpisodeStats>
where
    E: Env,
    M: PolicyValueModel,
    S: ActionSampler,
{
    let mut state = env.reset(seed)?;
    let mut steps = 0;
    let mut total_reward = 0f32;
    while steps < max_steps {
        let (action_probs, value) = model.forward(&state)?;
        let action = sampler.sample(&action_probs)?;
        let logp = action_probs.get(action)?.log()?;
        let SnapShot {
            state: next_state,
            reward,
            terminated,
            truncated,
        } = env.step(action)?;
        trajectory.push_step(logp, value, reward);
        total_reward += reward;
        steps += 1;
        if terminated || truncated {
            break;
        }
        state = next_state;
    }
    Ok(EpisodeStats {
        steps,
        total_reward,
    })
}
