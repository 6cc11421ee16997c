#[macro_export]
macro_rules! generate_labels {
    ($base_name:ident) => {
        $crate::OperationLabels {
            success: concat!(stringify!($base_name), "_success"),
            error: concat!(stringify!($base_name), "_error"),
            latency: concat!(stringify!($base_name), "_latency"),
        }
    };
}

/// Metric names a read is recorded under.
#[derive(Copy, Clone, Debug)]
pub struct OperationLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}

impl OperationLabels {
    pub const READS: OperationLabels = generate_labels!(readload_reads);
}

impl Default for OperationLabels {
    fn default() -> Self {
        Self::READS
    }
}
