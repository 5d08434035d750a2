/// Discounted sum of future rewards for every timestep, `G_t = r_t + gamma * G_{t+1}`.
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = vec![0.; rewards.len()];
    let mut discounted_sum = 0f32;
    for (i, reward) in rewards.iter().enumerate().rev() {
        discounted_sum = reward + gamma * discounted_sum;
        returns[i] = discounted_sum;
    }
    returns
}

/// Shifts to zero mean and scales to unit (population) standard deviation. `epsilon` keeps the
/// denominator away from zero when all values are equal.
pub fn normalize(values: &mut [f32], epsilon: f32) {
    if values.is_empty() {
        return;
    }
    let len = values.len() as f32;
    let mean = values.iter().sum::<f32>() / len;
    let variance = values.iter().map(|x| (*x - mean).powi(2)).sum::<f32>() / len;
    let std = variance.sqrt() + epsilon;
    for x in values.iter_mut() {
        *x = (*x - mean) / std;
    }
}

pub fn compute_returns(rewards: &[f32], gamma: f32, epsilon: f32) -> Vec<f32> {
    let mut returns = discounted_returns(rewards, gamma);
    normalize(&mut returns, epsilon);
    returns
}
