//! Error taxonomy shared across the workspace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Required lookup columns absent. Fatal, raised before any row is read.
    #[error("lookup table missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Destination-port field of a flow-log line failed to parse. Short lines
    /// are skipped as non-records, but a line long enough to be a record with
    /// a garbage port is corrupt input and fails the whole run.
    #[error("flow log line {line}: invalid destination port {value:?}")]
    DstPortField { line: u64, value: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
