pub mod cli;
pub mod client;
pub mod logging;
pub mod runtime;
pub mod signal;

mod error;

pub use crate::cli::Cli;
pub use crate::client::HttpStore;
pub use crate::error::RuntimeError;
pub use crate::runtime::ReadloadRuntime;
