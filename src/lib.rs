//! Darknet/YOLO training log tools.
//!
//! This crate provides:
//! - Two-stage extraction of structured telemetry from raw darknet training logs
//! - Grouping of per-head region diagnostics into passes via the index-reset rule
//! - CSV export of the flattened telemetry table
//! - Loss-curve SVG rendering
//!
//! # Binaries
//!
//! - `log-parser` - Parse one training log into a CSV table and a loss-curve SVG

pub mod csv_export;
pub mod entry;
pub mod loss_curve;
pub mod parser;
pub mod region;
pub mod scanner;

pub use csv_export::{export_entries_to_csv, write_entries_csv, CsvExportError, CSV_HEADER};
pub use entry::{LogEntry, RegionEntry, RegionGroup};
pub use loss_curve::{CurveConfig, CurveError, LossCurve};
pub use parser::{Clock, FixedClock, LogParser, ParseError, SystemClock};
pub use region::{GroupAccumulator, RegionExtractor};
pub use scanner::{AnchorMatch, AnchorScanner};
