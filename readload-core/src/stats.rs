use crate::LatencyPolicy;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMicroSecondsWithFrac};
use std::fmt;
use std::time::Duration;

/// Summary of a finished run, computed once from the recorded results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub name: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub success_rate: f64,
    /// Which durations `latency` was computed over.
    pub policy: LatencyPolicy,
    /// `None` when the policy selected no durations.
    pub latency: Option<LatencySummary>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} ok / {} tries, {:.2}% success):",
            self.name,
            self.succeeded,
            self.attempted,
            self.success_rate * 100.
        )?;
        match &self.latency {
            Some(latency) => write!(f, "{latency} [{}]", self.policy),
            None => write!(f, "no latency samples [{}]", self.policy),
        }
    }
}

/// Latency distribution over a set of recorded durations.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: usize,
    #[serde_as(as = "DurationMicroSecondsWithFrac<f64>")]
    pub min: Duration,
    #[serde_as(as = "DurationMicroSecondsWithFrac<f64>")]
    pub max: Duration,
    #[serde_as(as = "DurationMicroSecondsWithFrac<f64>")]
    pub mean: Duration,
    #[serde_as(as = "DurationMicroSecondsWithFrac<f64>")]
    pub stddev: Duration,
    #[serde_as(as = "DurationMicroSecondsWithFrac<f64>")]
    pub p50: Duration,
    #[serde_as(as = "DurationMicroSecondsWithFrac<f64>")]
    pub p90: Duration,
    #[serde_as(as = "DurationMicroSecondsWithFrac<f64>")]
    pub p95: Duration,
    #[serde_as(as = "DurationMicroSecondsWithFrac<f64>")]
    pub p99: Duration,
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  count={}, min={:?}, mean={:?}, stddev={:?}, max={:?}",
            self.count, self.min, self.mean, self.stddev, self.max,
        )?;
        write!(
            f,
            "  p50={:?}, p90={:?}, p95={:?}, p99={:?}",
            self.p50, self.p90, self.p95, self.p99,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> LatencySummary {
        let ms = Duration::from_millis;
        LatencySummary {
            count: 4,
            min: ms(1),
            max: ms(8),
            mean: ms(4),
            stddev: ms(2),
            p50: ms(3),
            p90: ms(8),
            p95: ms(8),
            p99: ms(8),
        }
    }

    #[test]
    fn report_renders_header_and_quantiles() {
        let report = Report {
            name: "reads".to_string(),
            attempted: 4,
            succeeded: 3,
            failed: 1,
            success_rate: 0.75,
            policy: LatencyPolicy::All,
            latency: Some(summary()),
        };
        let text = report.to_string();
        assert!(text.starts_with("reads (3 ok / 4 tries, 75.00% success):"));
        assert!(text.contains("p50=3ms"));
        assert!(text.contains("p99=8ms"));
        assert!(text.ends_with("[all]"));
    }

    #[test]
    fn report_without_samples() {
        let report = Report {
            name: "reads".to_string(),
            attempted: 2,
            succeeded: 2,
            failed: 0,
            success_rate: 1.,
            policy: LatencyPolicy::FailuresOnly,
            latency: None,
        };
        assert!(report
            .to_string()
            .ends_with("no latency samples [failures]"));
    }

    #[test]
    fn durations_serialize_as_micros() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["p50"], serde_json::json!(3000.0));
        assert_eq!(json["count"], serde_json::json!(4));
    }
}
