use readload::{LoadError, SetupError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("unable to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SetupError> for RuntimeError {
    fn from(err: SetupError) -> Self {
        Self::Load(err.into())
    }
}
