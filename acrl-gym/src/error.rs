use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("action {action} is outside of the action space of size {size}")]
    InvalidAction { action: usize, size: usize },
    #[error("step called on a finished episode, reset the environment first")]
    EpisodeFinished,
    #[error("unsupported space: {0}")]
    UnsupportedSpace(String),
    #[cfg(feature = "python")]
    #[error("python error: {0}")]
    Python(#[from] pyo3::PyErr),
}

impl From<EnvError> for candle_core::Error {
    fn from(err: EnvError) -> Self {
        candle_core::Error::wrap(err)
    }
}
