//! Training log parser binary.
//!
//! Usage:
//!   log-parser --log-file training.log [--source-dir <path>] [--save-dir <path>] [--csv-file <name>]
//!
//! Reads one darknet training log, writes the flattened telemetry CSV and a
//! loss-curve SVG into the save directory.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use darknet_log_tools::{export_entries_to_csv, LogParser, LossCurve};

#[derive(Parser)]
#[command(name = "log-parser")]
#[command(about = "Parse darknet training logs into CSV telemetry and a loss curve")]
#[command(version)]
struct Args {
    /// Directory containing the training log
    #[arg(long, default_value = "./")]
    source_dir: PathBuf,

    /// Directory the CSV and SVG are written to
    #[arg(long, default_value = "./")]
    save_dir: PathBuf,

    /// Output CSV file name (defaults to the log file's stem + .csv)
    #[arg(long)]
    csv_file: Option<String>,

    /// Training log file name
    #[arg(long)]
    log_file: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    if args.log_file.is_empty() {
        anyhow::bail!("log file must be specified");
    }
    let log_path = args.source_dir.join(&args.log_file);
    if !log_path.exists() {
        anyhow::bail!("log file does not exist: {}", log_path.display());
    }
    let stem = log_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("training")
        .to_string();

    tracing::info!("Parsing {}", log_path.display());
    let text = fs::read_to_string(&log_path)?;
    let entries = LogParser::new().parse(&text)?;
    tracing::info!("Parsed {} iterations", entries.len());

    let csv_name = args.csv_file.unwrap_or_else(|| format!("{}.csv", stem));
    let csv_path = args.save_dir.join(csv_name);
    export_entries_to_csv(&entries, &csv_path)?;
    tracing::info!("Wrote {}", csv_path.display());

    if entries.is_empty() {
        tracing::warn!("No iteration anchors found; skipping loss curve");
        return Ok(());
    }
    let svg_path = args.save_dir.join(format!("{}.svg", stem));
    LossCurve::from_entries(&entries).save_svg(&svg_path)?;
    tracing::info!("Wrote {}", svg_path.display());

    Ok(())
}
