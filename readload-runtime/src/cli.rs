use clap::Parser;
use readload::core::{
    DEFAULT_KEY_LIST, DEFAULT_MAX_CONCURRENCY, DEFAULT_POOL_SIZE, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_RUN_NAME, DEFAULT_SCRATCH_TABLE,
};
use readload::{LatencyPolicy, RunConfig};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3002";

/// Issue concurrent random reads against a key/value store and report latency.
#[derive(Parser, Debug, Clone)]
#[command(name = "readload", version, about)]
pub struct Cli {
    /// How long to run the load test for; 0 to run until SIGINT/SIGTERM.
    /// A second signal exits without draining in-flight reads
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub run_for: Duration,

    /// Maximum number of concurrent requests
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub req_count: usize,

    /// File with one key per line
    #[arg(long, default_value = DEFAULT_KEY_LIST)]
    pub key_list: PathBuf,

    /// Size of the idle connection pool kept by the client
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: usize,

    /// Name of the table to read from
    #[arg(long, default_value = DEFAULT_SCRATCH_TABLE)]
    pub scratch_table: String,

    /// Base URL of the store
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Give up on a single read after this long
    #[arg(long, value_parser = humantime::parse_duration)]
    pub op_timeout: Option<Duration>,

    /// Stop after this many reads have been issued
    #[arg(long)]
    pub max_ops: Option<u64>,

    /// Durations the latency summary covers: all, successes or failures
    #[arg(long, default_value_t = LatencyPolicy::All)]
    pub latency_policy: LatencyPolicy,

    /// Completed reads between progress lines
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_interval: u64,

    /// Name the report is printed under
    #[arg(long, default_value = DEFAULT_RUN_NAME)]
    pub name: String,

    /// Also print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        let mut config = RunConfig {
            max_concurrency: self.req_count,
            op_timeout: self.op_timeout,
            max_operations: self.max_ops,
            latency_policy: self.latency_policy,
            progress_interval: self.progress_interval,
            ..Default::default()
        };
        config.set_run_for(self.run_for);
        config
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::parse_from(["readload"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::default();
        assert_eq!(cli.run_for, Duration::from_secs(5));
        assert_eq!(cli.req_count, 100);
        assert_eq!(cli.pool_size, 1);
        assert_eq!(cli.key_list, PathBuf::from("key-list.txt"));
        assert_eq!(cli.scratch_table, "loadtest-scratch");
        assert!(!cli.json);

        let config = cli.run_config();
        assert_eq!(config.run_for, Some(Duration::from_secs(5)));
        assert_eq!(config.max_concurrency, 100);
        assert_eq!(config.latency_policy, LatencyPolicy::All);
    }

    #[test]
    fn zero_run_for_is_unbounded() {
        let cli = Cli::try_parse_from(["readload", "--run-for", "0"]).unwrap();
        assert_eq!(cli.run_config().run_for, None);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "readload",
            "--run-for",
            "1m 30s",
            "--req-count",
            "8",
            "--op-timeout",
            "250ms",
            "--max-ops",
            "1000",
            "--latency-policy",
            "successes",
            "--json",
        ])
        .unwrap();
        let config = cli.run_config();
        assert_eq!(config.run_for, Some(Duration::from_secs(90)));
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.op_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.max_operations, Some(1000));
        assert_eq!(config.latency_policy, LatencyPolicy::SuccessesOnly);
        assert!(cli.json);
    }

    #[test]
    fn positional_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["readload", "extra"]).is_err());
        assert!(Cli::try_parse_from(["readload", "--latency-policy", "median"]).is_err());
    }
}
