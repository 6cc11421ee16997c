use thiserror::Error;

/// Invalid run parameters. Always detected before the first admission.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("key set is empty; at least one key is required")]
    EmptyKeySet,

    #[error("progress interval must be at least 1")]
    ZeroProgressInterval,
}
