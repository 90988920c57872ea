//! End-to-end tests for darknet-log-tools
//!
//! Tests cover:
//! 1. Full-log parsing: anchors, spans, and pass grouping together
//! 2. LogEntry serialization/deserialization roundtrip
//! 3. CSV table layout against a fixed clock
//! 4. File export of CSV and SVG artifacts

use std::fs;

use chrono::{TimeZone, Utc};
use darknet_log_tools::{
    export_entries_to_csv, write_entries_csv, FixedClock, LogEntry, LogParser, LossCurve,
    CSV_HEADER,
};

fn region_line(index: u32, iou: f64) -> String {
    format!(
        "v3 (iou loss, Normalizer: (iou: 0.07, obj: 1.00, cls: 1.00) Region {} Avg \
         (IOU: {:.6}), count: 4, class_loss = 12.5, iou_loss = 3.25, total_loss = 15.75",
        index, iou
    )
}

fn anchor_line(iteration: u64, loss: f64, avg: f64) -> String {
    format!(
        "{}: {}, {} avg loss, 0.001 rate, 3.8 seconds, {} images, 99.1 hours left",
        iteration,
        loss,
        avg,
        iteration * 64
    )
}

/// A small but realistic log: startup noise, two passes of three heads
/// before the first anchor, one pass before the second, nothing before the
/// third.
fn sample_log() -> String {
    let mut log = String::from("layer filters size input output\nLoading weights from yolo.conv\n");
    for index in 0..3 {
        log.push_str(&region_line(index, 0.41 + index as f64 / 100.0));
        log.push('\n');
    }
    for index in 0..3 {
        log.push_str(&region_line(index, 0.52 + index as f64 / 100.0));
        log.push('\n');
    }
    log.push_str(&anchor_line(1, 6.5, 6.5));
    log.push('\n');
    for index in 0..3 {
        log.push_str(&region_line(index, 0.55 + index as f64 / 100.0));
        log.push('\n');
    }
    log.push_str(&anchor_line(2, 5.9, 6.2));
    log.push('\n');
    log.push_str("Resizing to 608x608\n");
    log.push_str(&anchor_line(3, 5.4, 5.9));
    log.push('\n');
    log
}

// ============================================================================
// Test 1: Full-log parsing
// ============================================================================

#[test]
fn parses_one_entry_per_anchor_with_grouped_passes() {
    let entries = LogParser::new().parse(&sample_log()).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries.iter().map(|e| e.iteration).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    // Two passes before the first anchor, one before the second, none
    // before the third.
    assert_eq!(entries[0].region_values.len(), 2);
    assert_eq!(entries[1].region_values.len(), 1);
    assert!(entries[2].region_values.is_empty());

    // Each pass covers all three heads.
    for pass in &entries[0].region_values {
        assert_eq!(pass.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    // The second pass of the first span carries the later readings.
    assert_eq!(entries[0].region_values[0][&0].iou, 0.41);
    assert_eq!(entries[0].region_values[1][&0].iou, 0.52);
}

#[test]
fn parsing_is_idempotent_over_the_same_input() {
    let log = sample_log();
    let parser = LogParser::new();
    let first = parser.parse(&log).unwrap();
    let second = parser.parse(&log).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.iteration, b.iteration);
        assert_eq!(a.loss, b.loss);
        assert_eq!(a.region_values, b.region_values);
    }
}

// ============================================================================
// Test 2: LogEntry serialization roundtrip
// ============================================================================

#[test]
fn log_entry_roundtrips_through_json() {
    let instant = Utc.with_ymd_and_hms(2018, 4, 25, 20, 28, 5).unwrap();
    let entries = LogParser::new()
        .parse_with_clock(&sample_log(), &FixedClock(instant))
        .unwrap();

    let json = serde_json::to_string(&entries).expect("serialization failed");
    let decoded: Vec<LogEntry> = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(entries, decoded);
}

// ============================================================================
// Test 3: CSV table layout
// ============================================================================

#[test]
fn csv_rows_follow_the_fixed_column_contract() {
    let instant = Utc.with_ymd_and_hms(2018, 4, 25, 20, 28, 5).unwrap();
    let entries = LogParser::new()
        .parse_with_clock(&sample_log(), &FixedClock(instant))
        .unwrap();

    let mut buf = Vec::new();
    write_entries_csv(&entries, &mut buf).unwrap();
    let csv = String::from_utf8(buf).unwrap();
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines[0], CSV_HEADER);
    // 2 passes * 3 heads for iteration 1, 1 pass * 3 heads for iteration 2.
    assert_eq!(lines.len(), 1 + 6 + 3);

    // First data row: iteration 1, head 0, first pass.
    assert_eq!(
        lines[1],
        "25.04.2018T20:28:05,1,6.5,6.5,0.001,0,0.07,1,1,0.41,4,3.25,12.5,15.75"
    );
    // All rows stamp the same injected time.
    for row in &lines[1..] {
        assert!(row.starts_with("25.04.2018T20:28:05,"));
    }
}

// ============================================================================
// Test 4: File export
// ============================================================================

#[test]
fn exports_csv_and_svg_artifacts() {
    let dir = std::env::temp_dir().join("darknet-log-tools-test");
    fs::create_dir_all(&dir).unwrap();

    let entries = LogParser::new().parse(&sample_log()).unwrap();

    let csv_path = dir.join("training.csv");
    export_entries_to_csv(&entries, &csv_path).unwrap();
    let written = fs::read_to_string(&csv_path).unwrap();
    assert!(written.starts_with(CSV_HEADER));
    assert_eq!(written.lines().count(), 10);

    let svg_path = dir.join("training.svg");
    LossCurve::from_entries(&entries).save_svg(&svg_path).unwrap();
    let svg = fs::read_to_string(&svg_path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));

    fs::remove_dir_all(&dir).ok();
}
