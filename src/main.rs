// =============================================================================
// ema-compare — Main Entry Point
// =============================================================================
//
// Two subcommands:
//   fetch    download hourly bars for a ticker and save them as CSV
//   compare  overlay smoothed price series from saved CSVs in one HTML chart
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod config;
mod dataset;
mod error;
mod fetch;
mod pipeline;
mod plot;
mod transform;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{CompareConfig, DEFAULT_COLUMN, DEFAULT_PATTERN, DEFAULT_SPAN};
use crate::fetch::{fetch_and_save, YahooClient, DEFAULT_CHUNK_DAYS};

#[derive(Parser)]
#[command(name = "ema-compare")]
#[command(about = "Fetch hourly price data and compare EMAs across tickers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download historical bars for a ticker and save them as CSV
    Fetch {
        /// Ticker symbol (e.g. WMT)
        symbol: String,

        /// Start date, YYYY-MM-DD
        #[arg(long)]
        start: String,

        /// End date, YYYY-MM-DD (exclusive)
        #[arg(long)]
        end: String,

        /// Bar interval (e.g. 1h, 1d)
        #[arg(long, default_value = "1h")]
        interval: String,

        /// Days per request chunk (provider range limit)
        #[arg(long, default_value_t = DEFAULT_CHUNK_DAYS)]
        chunk_days: i64,

        /// Directory the CSV file is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Render an EMA comparison chart from saved CSV files
    Compare {
        /// Explicit source files; when omitted, --data-dir is scanned
        inputs: Vec<PathBuf>,

        /// EMA smoothing window in periods
        #[arg(long, default_value_t = DEFAULT_SPAN)]
        num_days: usize,

        /// Name of the column to smooth
        #[arg(long, default_value = DEFAULT_COLUMN)]
        data_column: String,

        /// CSV field delimiter
        #[arg(long, default_value_t = ',')]
        separator: char,

        /// Output HTML file
        #[arg(long, default_value = "ema_comparison.html")]
        output: PathBuf,

        /// Directory scanned for sources when no inputs are given
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        /// Filename substring a scanned file must contain
        #[arg(long, default_value = DEFAULT_PATTERN)]
        pattern: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            symbol,
            start,
            end,
            interval,
            chunk_days,
            out_dir,
        } => {
            let client = YahooClient::new();
            fetch_and_save(&client, &symbol, &start, &end, &interval, chunk_days, &out_dir)
                .await?;
        }

        Commands::Compare {
            inputs,
            num_days,
            data_column,
            separator,
            output,
            data_dir,
            pattern,
        } => {
            if !separator.is_ascii() {
                anyhow::bail!("separator must be a single ASCII character");
            }
            let config = CompareConfig {
                span: num_days,
                column: data_column,
                separator: separator as u8,
                output,
                inputs,
                data_dir,
                pattern,
            };
            pipeline::run_compare(&config)?;
        }
    }

    Ok(())
}
