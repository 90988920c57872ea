//! CSV export for parsed log entries.
//!
//! Flattens each entry's nested region passes into one row per
//! (entry, pass, region) and writes the fixed 14-column table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::entry::LogEntry;

/// Header row of the exported table. Column order is a compatibility
/// contract for downstream consumers; note `IOU Loss` precedes `Class Loss`.
pub const CSV_HEADER: &str = "Time,Iteration,Loss,Avg Loss,Rate,Region,Norm IOU,Norm obj,\
Norm cls,IOU,Count,IOU Loss,Class Loss,Total Loss";

/// Timestamp layout of the Time column (24-hour clock).
const TIME_FORMAT: &str = "%d.%m.%YT%H:%M:%S";

/// Error type for CSV export operations.
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the header plus one row per (entry, pass, region) to `out`.
///
/// Entries without region passes contribute no rows; their loss data is
/// still available through the loss-curve path.
pub fn write_entries_csv<W: Write>(
    entries: &[LogEntry],
    out: &mut W,
) -> Result<(), CsvExportError> {
    writeln!(out, "{}", CSV_HEADER)?;
    for entry in entries {
        let time = entry.time.format(TIME_FORMAT).to_string();
        for group in &entry.region_values {
            for (index, region) in group {
                writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                    time,
                    entry.iteration,
                    entry.loss,
                    entry.average_loss,
                    entry.rate,
                    index,
                    region.normalizer_iou,
                    region.normalizer_obj,
                    region.normalizer_cls,
                    region.iou,
                    region.count,
                    region.iou_loss,
                    region.class_loss,
                    region.total_loss,
                )?;
            }
        }
    }
    Ok(())
}

/// Export entries to a CSV file at `path`.
pub fn export_entries_to_csv<P: AsRef<Path>>(
    entries: &[LogEntry],
    path: P,
) -> Result<(), CsvExportError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_entries_csv(entries, &mut out)?;
    out.flush()?;
    Ok(())
}
