use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Count of completed operations shared by every accumulator of a process.
///
/// Logs a progress line each time the total crosses a multiple of `interval`.
#[derive(Debug)]
pub struct ProgressCounter {
    completed: AtomicU64,
    interval: NonZeroU64,
}

impl ProgressCounter {
    pub fn new(interval: NonZeroU64) -> Self {
        Self {
            completed: AtomicU64::new(0),
            interval,
        }
    }

    /// Returns the new total.
    pub fn increment(&self) -> u64 {
        let n = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if n % self.interval.get() == 0 {
            info!("Progress: done {n} ops");
        }
        n
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn interval(&self) -> NonZeroU64 {
        self.interval
    }
}

impl Default for ProgressCounter {
    fn default() -> Self {
        let interval = NonZeroU64::new(readload_core::DEFAULT_PROGRESS_INTERVAL)
            .unwrap_or(NonZeroU64::MIN);
        Self::new(interval)
    }
}
