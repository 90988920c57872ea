//! Record assembly: anchors plus region passes into [`LogEntry`] records.

use chrono::{DateTime, Utc};

use crate::entry::LogEntry;
use crate::region::RegionExtractor;
use crate::scanner::{AnchorMatch, AnchorScanner};

/// Source of the timestamp stamped onto each record.
///
/// The log dialect carries no timestamp on anchor lines, so records are
/// stamped with the wall clock at assembly time. Injecting the clock lets
/// tests pin the formatted output.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant, for tests and reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Errors raised while parsing a training log.
///
/// Malformed numeric fields are fatal for the whole parse: downstream
/// records all depend on consistent indexing, so there is no partial-output
/// mode.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A headline field on an anchor line failed numeric conversion.
    #[error("invalid {field} '{value}' on anchor line")]
    Headline {
        /// Which headline field failed
        field: &'static str,
        /// The offending captured text
        value: String,
    },
    /// A field on a region diagnostic line failed numeric conversion.
    #[error("invalid {field} '{value}' on region line")]
    Region {
        /// Which region field failed
        field: &'static str,
        /// The offending captured text
        value: String,
    },
}

/// Two-stage training log parser.
///
/// Stage one finds iteration anchors; stage two extracts and groups the
/// region diagnostics from the span preceding each anchor. One [`LogEntry`]
/// is produced per anchor, in anchor order.
#[derive(Debug)]
pub struct LogParser {
    anchors: AnchorScanner,
    regions: RegionExtractor,
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            anchors: AnchorScanner::new(),
            regions: RegionExtractor::new(),
        }
    }

    /// Parse a full log buffer, stamping records with the wall clock.
    pub fn parse(&self, text: &str) -> Result<Vec<LogEntry>, ParseError> {
        self.parse_with_clock(text, &SystemClock)
    }

    /// Parse a full log buffer with an injected clock.
    pub fn parse_with_clock(
        &self,
        text: &str,
        clock: &dyn Clock,
    ) -> Result<Vec<LogEntry>, ParseError> {
        let mut entries = Vec::new();
        let mut prev: Option<AnchorMatch<'_>> = None;

        for anchor in self.anchors.scan(text) {
            let region_values = self.regions.extract(text, &anchor, prev.as_ref())?;
            entries.push(LogEntry {
                time: clock.now(),
                iteration: parse_headline(anchor.iteration, "iteration")?,
                loss: parse_headline(anchor.loss, "loss")?,
                average_loss: parse_headline(anchor.average_loss, "avg loss")?,
                rate: parse_headline(anchor.rate, "rate")?,
                region_values,
            });
            prev = Some(anchor);
        }
        Ok(entries)
    }
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_headline<T: std::str::FromStr>(
    raw: &str,
    field: &'static str,
) -> Result<T, ParseError> {
    raw.parse().map_err(|_| ParseError::Headline {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ANCHOR: &str =
        "100: 0.345, 0.400 avg loss, 0.001 rate, 1.2 seconds, 6400 images, 3.5 hours left";
    const REGION: &str = "v3 (iou loss, Normalizer: (iou: 0.07, obj: 1.00, cls: 1.00) \
        Region 0 Avg (IOU: 0.523977), count: 8, class_loss = 1194.319336, \
        iou_loss = 5.665416, total_loss = 1199.984741";

    #[test]
    fn single_anchor_with_one_region_pass() {
        let text = format!("{}\n{}\n", REGION, ANCHOR);
        let entries = LogParser::new().parse(&text).unwrap();

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.iteration, 100);
        assert_eq!(entry.loss, 0.345);
        assert_eq!(entry.average_loss, 0.400);
        assert_eq!(entry.rate, 0.001);
        assert_eq!(entry.region_values.len(), 1);
        assert_eq!(entry.region_values[0][&0].iou, 0.523977);
    }

    #[test]
    fn one_entry_per_anchor() {
        let text = "1: 6.5, 6.5 avg loss, 0.0 rate, 3.8 seconds, 64 images, 99.1 hours left\n\
                    Loaded 64 images in 0.5 seconds\n\
                    2: 5.9, 6.2 avg loss, 0.0 rate, 3.7 seconds, 128 images, 98.7 hours left\n";
        let entries = LogParser::new().parse(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].iteration, 1);
        assert_eq!(entries[1].iteration, 2);
    }

    #[test]
    fn consecutive_anchors_without_regions_yield_empty_passes() {
        let text = format!(
            "{}\n101: 0.3, 0.39 avg loss, 0.001 rate, 1.2 seconds, 6464 images, 3.4 hours left\n",
            ANCHOR
        );
        let entries = LogParser::new().parse(&text).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].region_values.is_empty());
    }

    #[test]
    fn malformed_headline_is_fatal() {
        // "abc" rate survives the outer shape but is not a float.
        let text =
            "100: 0.345, 0.400 avg loss, abc rate, 1.2 seconds, 6400 images, 3.5 hours left\n";
        let err = LogParser::new().parse(text).unwrap_err();
        assert!(matches!(err, ParseError::Headline { field: "rate", .. }));
    }

    #[test]
    fn records_carry_the_injected_clock_time() {
        let instant = Utc.with_ymd_and_hms(2018, 4, 25, 20, 28, 0).unwrap();
        let entries = LogParser::new()
            .parse_with_clock(ANCHOR, &FixedClock(instant))
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time, instant);
    }

    #[test]
    fn empty_input_yields_no_entries() {
        assert!(LogParser::new().parse("").unwrap().is_empty());
    }
}
