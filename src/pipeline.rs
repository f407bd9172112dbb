// =============================================================================
// Comparison Pipeline — load sources, smooth, render
// =============================================================================
//
// One pass, fully synchronous: discover source files, load each CSV, verify
// the target column, smooth it with a normalized EMA, and hand every labeled
// series to the chart renderer.  An empty source set is not an error; the
// output is then a valid chart with no traces.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::CompareConfig;
use crate::dataset::{ticker_from_path, Dataset};
use crate::plot::{render_comparison, LabeledSeries};
use crate::transform::compute_ema;

/// Resolve the source files for a run.
///
/// When the config names explicit inputs those are used as-is; otherwise
/// `data_dir` is scanned for files whose name contains `pattern`.  Scan
/// results are sorted so runs are deterministic.
pub fn discover_sources(config: &CompareConfig) -> Result<Vec<PathBuf>> {
    if !config.inputs.is_empty() {
        return Ok(config.inputs.clone());
    }

    let entries = std::fs::read_dir(&config.data_dir)
        .with_context(|| format!("failed to scan {}", config.data_dir.display()))?;

    let mut sources = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to scan {}", config.data_dir.display()))?
            .path();
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.contains(&config.pattern) {
            sources.push(path);
        }
    }

    sources.sort();
    Ok(sources)
}

/// Run one full comparison: load every source, compute its EMA series, and
/// write the overlay chart to `config.output`.
pub fn run_compare(config: &CompareConfig) -> Result<()> {
    let sources = discover_sources(config)?;
    if sources.is_empty() {
        warn!(
            dir = %config.data_dir.display(),
            pattern = %config.pattern,
            "no matching sources, writing an empty chart"
        );
    }

    let mut series = Vec::with_capacity(sources.len());
    for path in &sources {
        let dataset = Dataset::from_csv(path, config.separator)
            .with_context(|| format!("failed to load {}", path.display()))?;
        if dataset.is_empty() {
            warn!(path = %path.display(), "source has no rows, skipping");
            continue;
        }

        // Schema check happens here, before any transform runs.
        let values = dataset.numeric_column(&config.column)?;
        let timestamps = dataset.timestamps()?;
        let ema = compute_ema(&values, config.span, true)?;

        let label = ticker_from_path(path);
        info!(ticker = %label, rows = dataset.len(), span = config.span, "loaded source");

        series.push(LabeledSeries {
            label,
            timestamps,
            values: ema,
        });
    }

    render_comparison(&series, &config.output)?;
    Ok(())
}
