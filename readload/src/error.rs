use readload_core::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while preparing a run. Fatal, raised before the first admission.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unable to read key list {}: {source}", path.display())]
    KeyList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to reach backing store: {0}")]
    Connect(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("setup failed: {0}")]
    Setup(#[from] SetupError),
}
