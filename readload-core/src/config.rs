use crate::{ConfigError, DEFAULT_MAX_CONCURRENCY, DEFAULT_PROGRESS_INTERVAL, DEFAULT_RUN_FOR};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::{NonZeroU64, NonZeroUsize};
use std::str::FromStr;
use std::time::Duration;

/// Which recorded durations the final latency summary is computed over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyPolicy {
    /// Every completed operation, successful or not.
    #[default]
    All,
    SuccessesOnly,
    FailuresOnly,
}

impl LatencyPolicy {
    pub fn includes(&self, success: bool) -> bool {
        match self {
            LatencyPolicy::All => true,
            LatencyPolicy::SuccessesOnly => success,
            LatencyPolicy::FailuresOnly => !success,
        }
    }
}

impl fmt::Display for LatencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LatencyPolicy::All => "all",
            LatencyPolicy::SuccessesOnly => "successes",
            LatencyPolicy::FailuresOnly => "failures",
        };
        f.write_str(name)
    }
}

impl FromStr for LatencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(LatencyPolicy::All),
            "successes" | "successes-only" | "ok" => Ok(LatencyPolicy::SuccessesOnly),
            "failures" | "failures-only" | "errors" => Ok(LatencyPolicy::FailuresOnly),
            other => Err(format!(
                "unknown latency policy `{other}` (expected all, successes or failures)"
            )),
        }
    }
}

/// Parameters of a single load run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// How long to keep admitting reads. `None` runs until stopped externally.
    pub run_for: Option<Duration>,
    pub max_concurrency: usize,
    /// Deadline applied to each read. `None` waits on the store indefinitely.
    pub op_timeout: Option<Duration>,
    /// Total number of reads to admit. `None` is unbounded.
    pub max_operations: Option<u64>,
    pub latency_policy: LatencyPolicy,
    pub progress_interval: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_for: Some(DEFAULT_RUN_FOR),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            op_timeout: None,
            max_operations: None,
            latency_policy: LatencyPolicy::All,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl RunConfig {
    /// Map a zero duration to "run until stopped".
    pub fn set_run_for(&mut self, run_for: Duration) {
        self.run_for = if run_for.is_zero() {
            None
        } else {
            Some(run_for)
        };
    }

    pub fn validate(&self) -> Result<ValidatedLimits, ConfigError> {
        let max_concurrency =
            NonZeroUsize::new(self.max_concurrency).ok_or(ConfigError::ZeroConcurrency)?;
        let progress_interval =
            NonZeroU64::new(self.progress_interval).ok_or(ConfigError::ZeroProgressInterval)?;
        Ok(ValidatedLimits {
            max_concurrency,
            progress_interval,
        })
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.run_for {
            Some(run_for) => write!(f, "run_for={}", humantime::format_duration(run_for))?,
            None => write!(f, "run_for=unbounded")?,
        }
        write!(f, ", max_concurrency={}", self.max_concurrency)?;
        if let Some(timeout) = self.op_timeout {
            write!(f, ", op_timeout={}", humantime::format_duration(timeout))?;
        }
        if let Some(max_operations) = self.max_operations {
            write!(f, ", max_operations={max_operations}")?;
        }
        write!(f, ", latency_policy={}", self.latency_policy)
    }
}

/// Limits of a `RunConfig` that passed validation.
#[derive(Clone, Copy, Debug)]
pub struct ValidatedLimits {
    pub max_concurrency: NonZeroUsize,
    pub progress_interval: NonZeroU64,
}
