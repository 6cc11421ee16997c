use crate::progress::ProgressCounter;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Outcome of one dispatched read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub duration: Duration,
}

/// Raw results of a run. `results.len() == attempted` and `attempted >= succeeded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    attempted: u64,
    succeeded: u64,
    results: Vec<OperationResult>,
}

impl Stats {
    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded
    }

    pub fn failed(&self) -> u64 {
        self.attempted - self.succeeded
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    pub fn durations(&self) -> impl Iterator<Item = Duration> + '_ {
        self.results.iter().map(|r| r.duration)
    }

    fn push(&mut self, result: OperationResult) {
        self.attempted += 1;
        if result.success {
            self.succeeded += 1;
        }
        self.results.push(result);
    }
}

impl FromIterator<OperationResult> for Stats {
    fn from_iter<I: IntoIterator<Item = OperationResult>>(iter: I) -> Self {
        let mut stats = Stats::default();
        for result in iter {
            stats.push(result);
        }
        stats
    }
}

/// Collects results from any number of concurrent workers.
#[derive(Debug)]
pub struct StatsAccumulator {
    stats: Mutex<Stats>,
    progress: Arc<ProgressCounter>,
}

impl StatsAccumulator {
    pub fn new(progress: Arc<ProgressCounter>) -> Self {
        Self {
            stats: Mutex::new(Stats::default()),
            progress,
        }
    }

    pub fn record(&self, success: bool, duration: Duration) {
        {
            // NOTE: `push` cannot panic halfway, so a poisoned lock still holds consistent data
            let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
            stats.push(OperationResult { success, duration });
        }

        self.progress.increment();
    }

    pub fn snapshot(&self) -> Stats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn into_stats(self) -> Stats {
        self.stats
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn progress(&self) -> &Arc<ProgressCounter> {
        &self.progress
    }
}
