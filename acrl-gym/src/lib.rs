pub mod cart_pole;
pub mod error;
#[cfg(feature = "python")]
pub mod gym_env;

pub use cart_pole::{CartPole, CartPoleConfig};
pub use error::EnvError;
#[cfg(feature = "python")]
pub use gym_env::GymEnv;
