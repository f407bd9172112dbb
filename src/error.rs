// =============================================================================
// Domain Errors — contract-level failures for the EMA toolkit
// =============================================================================
//
// These are the failures callers are expected to match on.  Everything else
// (file I/O, network, JSON decoding) propagates as `anyhow::Error` with
// context attached at the call site.

use thiserror::Error;

/// Result alias for transform and dataset operations.
pub type Result<T> = core::result::Result<T, EmaError>;

/// Errors with a defined contract: bad parameters, bad schema, bad values.
#[derive(Debug, Error)]
pub enum EmaError {
    /// Invalid parameter or degenerate numeric input (non-positive span,
    /// empty or constant series).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A column the configuration names is absent from a loaded dataset.
    #[error("Column '{column}' not found in the provided data")]
    Schema {
        /// Name of the missing column.
        column: String,
    },

    /// A cell that must hold a real number does not parse as one.
    #[error("Non-numeric value in column '{column}' at row {row}")]
    NonNumeric {
        /// Column the bad cell belongs to.
        column: String,
        /// Zero-based data-row index (header excluded).
        row: usize,
    },
}
