//! Region diagnostic extraction and pass grouping.
//!
//! Between two consecutive iteration anchors the log carries zero or more
//! per-head diagnostic lines:
//!
//! ```text
//! v3 (iou loss, Normalizer: (iou: 0.07, obj: 1.00, cls: 1.00) Region 139 Avg (IOU: 0.523977), count: 8, class_loss = 1194.3, iou_loss = 5.6, total_loss = 1199.9
//! ```
//!
//! Heads report in increasing index order and the format has no explicit
//! pass separator, so a drop in the region index is the only signal that a
//! new pass has started. [`GroupAccumulator`] encodes that reset rule;
//! [`RegionExtractor`] applies it to the span between anchors.

use regex::{Captures, Regex};

use crate::entry::{RegionEntry, RegionGroup};
use crate::parser::ParseError;
use crate::scanner::AnchorMatch;

/// Region line shape. Floats must carry a decimal point (`3.0` or `.5`,
/// never a bare `3`).
const REGION_PATTERN: &str = r".*: \(iou: (\d*\.\d+), obj: (\d*\.\d+), cls: (\d*\.\d+)\) Region (\d*) Avg \(IOU: (\d*\.\d+)\), count: (\d*), class_loss = (\d*\.\d+), iou_loss = (\d*\.\d+), total_loss = (\d*\.\d+)";

/// Accumulates region readings into passes using the index-reset rule.
///
/// State is one open group plus the last index seen. A reading whose index
/// is lower than the previous one seals the open group and starts the next
/// pass; [`finish`](Self::finish) seals whatever is still open at span end.
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    sealed: Vec<RegionGroup>,
    open: RegionGroup,
    last_index: Option<u32>,
}

impl GroupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one reading, sealing the open group first when `index` drops
    /// below the previous reading's index. A repeated index within a pass
    /// overwrites the earlier reading.
    pub fn push(&mut self, index: u32, entry: RegionEntry) {
        if let Some(last) = self.last_index {
            if index < last {
                self.sealed.push(std::mem::take(&mut self.open));
            }
        }
        self.open.insert(index, entry);
        self.last_index = Some(index);
    }

    /// Seal the trailing group, if non-empty, and return all passes in
    /// arrival order.
    pub fn finish(mut self) -> Vec<RegionGroup> {
        if !self.open.is_empty() {
            self.sealed.push(self.open);
        }
        self.sealed
    }
}

/// Extracts and groups region diagnostics from the span between two anchors.
#[derive(Debug)]
pub struct RegionExtractor {
    pattern: Regex,
}

impl RegionExtractor {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(REGION_PATTERN).expect("region pattern is valid"),
        }
    }

    /// Extract all region lines strictly between the end of `prev` (or the
    /// start of the buffer when there is no previous anchor) and the start
    /// of `cur`, grouped into passes.
    ///
    /// A span without region lines yields an empty sequence; that is not an
    /// error.
    pub fn extract(
        &self,
        text: &str,
        cur: &AnchorMatch<'_>,
        prev: Option<&AnchorMatch<'_>>,
    ) -> Result<Vec<RegionGroup>, ParseError> {
        let span_start = prev.map_or(0, |p| p.end);
        let span = &text[span_start..cur.start];

        let mut groups = GroupAccumulator::new();
        for caps in self.pattern.captures_iter(span) {
            let index = parse_field(&caps, 4, "region index")?;
            let entry = RegionEntry {
                normalizer_iou: parse_field(&caps, 1, "iou normalizer")?,
                normalizer_obj: parse_field(&caps, 2, "obj normalizer")?,
                normalizer_cls: parse_field(&caps, 3, "cls normalizer")?,
                iou: parse_field(&caps, 5, "avg IOU")?,
                count: parse_field(&caps, 6, "count")?,
                class_loss: parse_field(&caps, 7, "class_loss")?,
                iou_loss: parse_field(&caps, 8, "iou_loss")?,
                total_loss: parse_field(&caps, 9, "total_loss")?,
            };
            groups.push(index, entry);
        }
        Ok(groups.finish())
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_field<T: std::str::FromStr>(
    caps: &Captures<'_>,
    index: usize,
    field: &'static str,
) -> Result<T, ParseError> {
    let raw = caps.get(index).map_or("", |m| m.as_str());
    raw.parse().map_err(|_| ParseError::Region {
        field,
        value: raw.to_string(),
    })
}
