pub mod optimizer;
pub mod policy_value_net;
pub mod sequential;
