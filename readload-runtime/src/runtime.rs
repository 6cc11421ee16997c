//! Default readload runner.
//!
//! Loads the key list, dials the store, runs the load test until its deadline or a shutdown
//! signal, and logs the final report.
use crate::signal::{graceful_signal, shutdown_signal};
use crate::{client::HttpStore, error::RuntimeError, Cli};
use clap::Parser;
use readload::{KeySet, LoadTest, Report};
use std::future::Future;
#[allow(unused)]
use tracing::{debug, error, info, instrument};

const EXIT_INTERRUPTED: i32 = 130;

/// Command line driven load test runner.
///
/// # Example
///
/// ```no_run
/// use readload_runtime::ReadloadRuntime;
///
/// #[tokio::main]
/// async fn main() {
///     let report = ReadloadRuntime::new().with_args().run().await;
/// }
/// ```
pub struct ReadloadRuntime {
    args: Cli,
}

impl Default for ReadloadRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadloadRuntime {
    pub fn new() -> Self {
        Self {
            args: Cli::default(),
        }
    }

    /// Use the process arguments. See `readload --help`.
    pub fn with_args(mut self) -> Self {
        self.args = Cli::parse();
        self
    }

    pub fn args(mut self, args: Cli) -> Self {
        self.args = args;
        self
    }

    /// Run until the configured deadline or SIGINT/SIGTERM. A second signal exits the process
    /// without waiting for in-flight reads.
    pub async fn run(self) -> Result<Report, RuntimeError> {
        self.run_until(graceful_signal(shutdown_signal, || {
            std::process::exit(EXIT_INTERRUPTED)
        }))
        .await
    }

    /// Run until the configured deadline or until `stop` resolves.
    #[instrument(name = "readload", skip_all, fields(table = %self.args.scratch_table))]
    pub async fn run_until<S>(self, stop: S) -> Result<Report, RuntimeError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let args = self.args;
        let config = args.run_config();
        config.validate().map_err(readload::LoadError::from)?;

        let keys = KeySet::load(&args.key_list)?;
        info!("Loaded {} keys from {}", keys.len(), args.key_list.display());

        let store = HttpStore::connect(&args.endpoint, &args.scratch_table, args.pool_size).await?;

        match config.run_for {
            Some(run_for) => info!(
                "Starting load test... (run for {})",
                humantime::format_duration(run_for)
            ),
            None => info!("Starting load test... (run until stopped)"),
        }
        let stats = LoadTest::new(&args.name, store, keys)
            .config(config)
            .until(stop)
            .await?;

        let report = stats.report();
        info!("{report}");
        info!("Throughput: {:.2} reads/s", stats.throughput());

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Ok(report)
    }
}
