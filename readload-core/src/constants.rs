use std::time::Duration;

/// Default run length when none is given on the command line.
pub const DEFAULT_RUN_FOR: Duration = Duration::from_secs(5);

/// Default maximum number of reads in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;

/// Completed operations between two progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Default idle connection pool size handed to the store client.
pub const DEFAULT_POOL_SIZE: usize = 1;

pub const DEFAULT_SCRATCH_TABLE: &str = "loadtest-scratch";

pub const DEFAULT_KEY_LIST: &str = "key-list.txt";

/// Name the final report is printed under.
pub const DEFAULT_RUN_NAME: &str = "reads";
