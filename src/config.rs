// =============================================================================
// Comparison Configuration
// =============================================================================
//
// All knobs for one comparison run live in this struct and are passed down
// explicitly; nothing reads ambient CLI state below `main`.

use std::path::PathBuf;

/// Smoothing window used when no span is given.
pub const DEFAULT_SPAN: usize = 10;

/// Target value column used when none is given.
pub const DEFAULT_COLUMN: &str = "Close";

/// Filename substring used to discover sources when no explicit list is given.
pub const DEFAULT_PATTERN: &str = "hourly";

/// Configuration for one comparison run.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// EMA smoothing window.
    pub span: usize,
    /// Name of the numeric column to smooth.
    pub column: String,
    /// CSV field delimiter.
    pub separator: u8,
    /// Destination of the rendered HTML chart.
    pub output: PathBuf,
    /// Explicit source files. When empty, `data_dir` is scanned instead.
    pub inputs: Vec<PathBuf>,
    /// Directory scanned for sources when `inputs` is empty.
    pub data_dir: PathBuf,
    /// Filename substring a scanned file must contain to count as a source.
    pub pattern: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            span: DEFAULT_SPAN,
            column: DEFAULT_COLUMN.to_string(),
            separator: b',',
            output: PathBuf::from("ema_comparison.html"),
            inputs: Vec::new(),
            data_dir: PathBuf::from("."),
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}
