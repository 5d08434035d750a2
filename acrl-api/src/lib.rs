// builders + higher level helpers
pub mod builders;
pub mod utils;
