use crate::accumulator::OperationResult;
use readload_core::OperationLabels;
use std::sync::Arc;
use std::time::{Duration, Instant};
#[allow(unused)]
use tracing::{debug, error, trace, warn};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single read against the backing store.
///
/// `Ok(found)` counts as a success whether or not the key existed; any `Err` is a failure.
/// Retries and consistency semantics are up to the implementation.
#[trait_variant::make(ReadOperation: Send)]
pub trait LocalReadOperation {
    async fn read(&self, key: &str) -> Result<bool, BoxError>;
}

impl<T> ReadOperation for Arc<T>
where
    T: ReadOperation + Sync,
{
    async fn read(&self, key: &str) -> Result<bool, BoxError> {
        self.as_ref().read(key).await
    }
}

/// Run one read, timing it and classifying the outcome.
pub async fn timed_read<O>(
    op: &O,
    key: &str,
    timeout: Option<Duration>,
    labels: OperationLabels,
) -> OperationResult
where
    O: ReadOperation,
{
    let start = Instant::now();
    let res = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, op.read(key)).await {
            Ok(res) => res,
            Err(_) => Err(format!(
                "read timed out after {}",
                humantime::format_duration(timeout)
            )
            .into()),
        },
        None => op.read(key).await,
    };
    let duration = start.elapsed();

    #[cfg(feature = "metrics")]
    {
        metrics::describe_histogram!(labels.latency, metrics::Unit::Seconds, "");
        metrics::histogram!(labels.latency).record(duration.as_secs_f64());
    }

    let success = match res {
        Ok(found) => {
            trace!("Read {key} (found={found}) in {duration:?}");
            #[cfg(feature = "metrics")]
            metrics::counter!(labels.success).increment(1);
            true
        }
        Err(err) => {
            warn!("Error doing read of {key}: {err}");
            #[cfg(feature = "metrics")]
            metrics::counter!(labels.error).increment(1);
            false
        }
    };

    #[cfg(not(feature = "metrics"))]
    let _ = labels;

    OperationResult { success, duration }
}
