//! Bounded-concurrency dispatch of reads.
use crate::accumulator::{Stats, StatsAccumulator};
use crate::error::LoadError;
use crate::keys::KeySet;
use crate::operation::{timed_read, ReadOperation};
use crate::progress::ProgressCounter;
use crate::report::summarize;
use readload_core::{LatencyPolicy, OperationLabels, Report, RunConfig};
use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

type StopSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Admitting new reads.
    Running,
    /// No new admissions; waiting on in-flight reads.
    Draining,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Deadline,
    Signal,
    Budget,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Deadline => f.write_str("deadline reached"),
            StopReason::Signal => f.write_str("stop signal"),
            StopReason::Budget => f.write_str("operation budget spent"),
        }
    }
}

/// Results of a finished run.
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub name: String,
    pub stats: Stats,
    pub admitted: u64,
    /// Wall time from the first admission until the last read finished.
    pub elapsed: Duration,
    pub policy: LatencyPolicy,
}

impl RunStatistics {
    pub fn report(&self) -> Report {
        summarize(&self.name, &self.stats, self.policy)
    }

    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0. {
            self.stats.attempted() as f64 / secs
        } else {
            0.
        }
    }
}

/// A read load test against `op`.
///
/// Awaiting the value runs it. At most `max_concurrency` reads are in flight at once; once
/// the deadline passes, the stop signal fires or the operation budget is spent, admission
/// stops and every in-flight read is allowed to finish.
///
/// # Example
/// ```no_run
/// use readload::prelude::*;
/// use std::time::Duration;
///
/// struct Noop;
///
/// impl ReadOperation for Noop {
///     async fn read(&self, _key: &str) -> Result<bool, BoxError> {
///         Ok(true)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), LoadError> {
///     let keys = KeySet::new(vec!["row-1".to_string()])?;
///     let stats = LoadTest::new("reads", Noop, keys)
///         .max_concurrency(16)
///         .run_for(Duration::from_secs(5))
///         .await?;
///     println!("{}", stats.report());
///     Ok(())
/// }
/// ```
pub struct LoadTest<O> {
    name: String,
    op: Arc<O>,
    keys: Arc<KeySet>,
    config: RunConfig,
    labels: OperationLabels,
    progress: Option<Arc<ProgressCounter>>,
    stop: Option<StopSignal>,
    phase: watch::Sender<Phase>,
}

impl<O> LoadTest<O>
where
    O: ReadOperation + Send + Sync + 'static,
{
    pub fn new(name: &str, op: O, keys: KeySet) -> Self {
        Self::from_shared(name, Arc::new(op), Arc::new(keys))
    }

    pub fn from_shared(name: &str, op: Arc<O>, keys: Arc<KeySet>) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            name: name.to_string(),
            op,
            keys,
            config: RunConfig::default(),
            labels: OperationLabels::default(),
            progress: None,
            stop: None,
            phase,
        }
    }

    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// A zero duration runs until the stop signal fires.
    pub fn run_for(mut self, run_for: Duration) -> Self {
        self.config.set_run_for(run_for);
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    pub fn op_timeout(mut self, timeout: Duration) -> Self {
        self.config.op_timeout = Some(timeout);
        self
    }

    pub fn max_operations(mut self, max_operations: u64) -> Self {
        self.config.max_operations = Some(max_operations);
        self
    }

    pub fn latency_policy(mut self, policy: LatencyPolicy) -> Self {
        self.config.latency_policy = policy;
        self
    }

    pub fn labels(mut self, labels: OperationLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Share a progress counter with other runs in the process.
    pub fn progress(mut self, progress: Arc<ProgressCounter>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Stop admitting reads once `stop` resolves.
    pub fn until<S>(mut self, stop: S) -> Self
    where
        S: Future<Output = ()> + Send + 'static,
    {
        self.stop = Some(Box::pin(stop));
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    #[instrument(name = "load_test", skip_all, fields(name = %self.name))]
    pub async fn run(self) -> Result<RunStatistics, LoadError> {
        let LoadTest {
            name,
            op,
            keys,
            config,
            labels,
            progress,
            stop,
            phase,
        } = self;

        let limits = config.validate()?;
        let max_concurrency = limits.max_concurrency.get();
        let progress =
            progress.unwrap_or_else(|| Arc::new(ProgressCounter::new(limits.progress_interval)));
        let stats = Arc::new(StatsAccumulator::new(progress));
        let permits = Arc::new(Semaphore::new(max_concurrency));
        let mut stop: StopSignal = match stop {
            Some(stop) => stop,
            None => Box::pin(std::future::pending()),
        };

        info!("Starting load test ({config}) over {} keys", keys.len());
        let start = Instant::now();
        let deadline = config.run_for.map(|run_for| start + run_for);
        set_phase(&phase, Phase::Running);

        let mut tasks = JoinSet::new();
        let mut admitted: u64 = 0;
        let reason = loop {
            if config.max_operations.is_some_and(|max| admitted >= max) {
                break StopReason::Budget;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break StopReason::Deadline;
            }

            let permit = tokio::select! {
                biased;

                _ = &mut stop => break StopReason::Signal,
                _ = sleep_until_deadline(deadline) => break StopReason::Deadline,
                Some(res) = tasks.join_next(), if !tasks.is_empty() => {
                    log_task_result(res);
                    continue;
                }
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        error!("Admission semaphore closed unexpectedly.");
                        break StopReason::Signal;
                    }
                },
            };

            admitted += 1;
            let op = op.clone();
            let keys = keys.clone();
            let stats = stats.clone();
            let timeout = config.op_timeout;
            tasks.spawn(async move {
                let key = keys.pick(&mut rand::thread_rng()).to_owned();
                let result = timed_read(op.as_ref(), &key, timeout, labels).await;
                stats.record(result.success, result.duration);
                drop(permit);
            });
        };

        info!(
            "Stopping admissions ({reason}); draining {} in-flight reads",
            tasks.len()
        );
        set_phase(&phase, Phase::Draining);

        while let Some(res) = tasks.join_next().await {
            log_task_result(res);
        }
        let elapsed = start.elapsed();
        debug_assert_eq!(permits.available_permits(), max_concurrency);

        set_phase(&phase, Phase::Terminal);
        info!(
            "Load test complete: {admitted} reads in {}",
            humantime::format_duration(round_to_millis(elapsed))
        );

        let stats = match Arc::try_unwrap(stats) {
            Ok(stats) => stats.into_stats(),
            Err(stats) => stats.snapshot(),
        };

        Ok(RunStatistics {
            name,
            stats,
            admitted,
            elapsed,
            policy: config.latency_policy,
        })
    }
}

impl<O> IntoFuture for LoadTest<O>
where
    O: ReadOperation + Send + Sync + 'static,
{
    type Output = Result<RunStatistics, LoadError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.run())
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn set_phase(phase: &watch::Sender<Phase>, next: Phase) {
    let prev = phase.send_replace(next);
    debug!("Phase {prev:?} -> {next:?}");
}

fn log_task_result(res: Result<(), tokio::task::JoinError>) {
    if let Err(err) = res {
        error!("Read task failed before recording its result: {err}");
    }
}

fn round_to_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}
