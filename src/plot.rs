// =============================================================================
// Chart Rendering — interactive HTML comparison plot
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use plotly::common::Mode;
use plotly::layout::{Axis, Legend};
use plotly::{Layout, Plot, Scatter};
use tracing::info;

/// One labeled series ready for plotting: x = timestamps, y = smoothed values.
#[derive(Debug, Clone)]
pub struct LabeledSeries {
    /// Legend entry, conventionally the ticker symbol.
    pub label: String,
    pub timestamps: Vec<String>,
    pub values: Vec<f64>,
}

/// Build the overlay chart for `series`.
///
/// Each series becomes one line trace keyed by its own timestamps; alignment
/// across unevenly-sampled series is left to the chart engine.  Zero series
/// still yields a valid (empty) figure.
pub fn comparison_plot(series: &[LabeledSeries]) -> Plot {
    let mut plot = Plot::new();

    for s in series {
        let trace = Scatter::new(s.timestamps.clone(), s.values.clone())
            .mode(Mode::Lines)
            .name(&s.label);
        plot.add_trace(trace);
    }

    let layout = Layout::new()
        .title("Comparison of EMAs")
        .x_axis(Axis::new().title("Date"))
        .y_axis(Axis::new().title("EMA"))
        .legend(Legend::new().title("EMA Names"))
        .width(900)
        .height(600);
    plot.set_layout(layout);

    plot
}

/// Render `series` as a self-contained HTML document at `output`.
pub fn render_comparison(series: &[LabeledSeries], output: &Path) -> Result<()> {
    let html = comparison_plot(series).to_html();
    std::fs::write(output, html)
        .with_context(|| format!("failed to write plot to {}", output.display()))?;
    info!(path = %output.display(), series = series.len(), "plot saved");
    Ok(())
}
