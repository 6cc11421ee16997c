//! Final aggregation of a run's results.
use crate::accumulator::Stats;
use readload_core::{LatencyPolicy, LatencySummary, Report};
use std::time::Duration;

/// Summarize finished `stats`, computing the latency distribution over the durations
/// `policy` selects. Does not mutate its input; equal inputs give equal reports.
pub fn summarize(name: &str, stats: &Stats, policy: LatencyPolicy) -> Report {
    let attempted = stats.attempted();
    let succeeded = stats.succeeded();
    let success_rate = if attempted == 0 {
        0.
    } else {
        succeeded as f64 / attempted as f64
    };

    let mut sample: Vec<Duration> = stats
        .results()
        .iter()
        .filter(|r| policy.includes(r.success))
        .map(|r| r.duration)
        .collect();

    Report {
        name: name.to_string(),
        attempted,
        succeeded,
        failed: stats.failed(),
        success_rate,
        policy,
        latency: latency_summary(&mut sample),
    }
}

fn latency_summary(sample: &mut [Duration]) -> Option<LatencySummary> {
    if sample.is_empty() {
        return None;
    }
    sample.sort_unstable();

    let secs: Vec<f64> = sample.iter().map(Duration::as_secs_f64).collect();
    let mean = statistical::mean(&secs);
    // NOTE: sample standard deviation is undefined for a single value
    let stddev = if secs.len() > 1 {
        statistical::standard_deviation(&secs, Some(mean))
    } else {
        0.
    };

    Some(LatencySummary {
        count: sample.len(),
        min: sample[0],
        max: sample[sample.len() - 1],
        mean: from_secs(mean),
        stddev: from_secs(stddev),
        p50: quantile(sample, 0.50),
        p90: quantile(sample, 0.90),
        p95: quantile(sample, 0.95),
        p99: quantile(sample, 0.99),
    })
}

/// Nearest-rank quantile of a sorted, non-empty sample.
fn quantile(sorted: &[Duration], q: f64) -> Duration {
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs >= 0. {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}
