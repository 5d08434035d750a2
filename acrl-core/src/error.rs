use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("cannot assemble losses from an empty trajectory")]
    EmptyTrajectory,
    #[error("trajectory has {transitions} transitions but {returns} returns were given")]
    LengthMismatch { transitions: usize, returns: usize },
    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),
}

impl From<TrainingError> for candle_core::Error {
    fn from(err: TrainingError) -> Self {
        candle_core::Error::wrap(err)
    }
}
