pub mod losses;
pub mod returns;
pub mod running_reward;
pub mod trajectory;
