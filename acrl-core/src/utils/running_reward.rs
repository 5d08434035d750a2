/// Exponential moving average of episode rewards.
#[derive(Debug, Clone, Copy)]
pub struct RunningReward {
    value: f32,
    decay: f32,
}

impl RunningReward {
    /// `decay` is the weight given to the newest episode.
    pub fn new(decay: f32) -> Self {
        Self { value: 0., decay }
    }

    pub fn update(&mut self, episode_reward: f32) -> f32 {
        self.value = self.decay * episode_reward + (1. - self.decay) * self.value;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn exceeds(&self, threshold: f32) -> bool {
        self.value > threshold
    }
}
