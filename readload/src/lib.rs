#![cfg_attr(docsrs, feature(doc_cfg))]
//! Bounded-concurrency read load generation.
//!
//! A [`LoadTest`] issues reads through a [`ReadOperation`] against random keys from a
//! [`KeySet`], never holding more than `max_concurrency` reads in flight. Every outcome is
//! recorded in a [`StatsAccumulator`]; once the run drains, [`summarize`] turns the raw
//! results into a [`Report`].

pub mod accumulator;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod operation;
pub mod progress;
pub mod report;

pub use accumulator::{OperationResult, Stats, StatsAccumulator};
pub use dispatch::{LoadTest, Phase, RunStatistics};
pub use error::{LoadError, SetupError};
pub use keys::KeySet;
pub use operation::{timed_read, BoxError, LocalReadOperation, ReadOperation};
pub use progress::ProgressCounter;
pub use report::summarize;

#[doc(hidden)]
pub use readload_core as core;
pub use readload_core::{
    ConfigError, LatencyPolicy, LatencySummary, OperationLabels, Report, RunConfig,
};

pub mod prelude {
    pub use crate::dispatch::{LoadTest, RunStatistics};
    pub use crate::error::LoadError;
    pub use crate::keys::KeySet;
    pub use crate::operation::{BoxError, ReadOperation};
    pub use readload_core::{LatencyPolicy, Report, RunConfig};
}
