//! Iteration anchor scanning.
//!
//! An anchor line marks the start of a new training iteration and carries the
//! headline metrics:
//!
//! ```text
//! 100: 0.345, 0.400 avg loss, 0.001 rate, 1.2 seconds, 6400 images, 3.5 hours left
//! ```
//!
//! The scanner finds every anchor in the raw log buffer and exposes the four
//! captured fields plus the match offsets. Lines of any other shape are
//! skipped; the scanner never errors on unrecognized content.

use regex::{Captures, Regex};

/// Anchor line shape. The seconds/images/hours-left fields are matched but
/// not captured; nothing downstream uses them.
const ANCHOR_PATTERN: &str =
    r"(\d.*): (.*?), (.*?) avg loss, (.*?) rate, .*? seconds, .*? images, .*? hours left";

/// One anchor match: borrowed headline captures plus byte offsets into the
/// log buffer.
#[derive(Debug, Clone, Copy)]
pub struct AnchorMatch<'t> {
    /// Iteration number, as captured text
    pub iteration: &'t str,
    /// Total loss, as captured text
    pub loss: &'t str,
    /// Running average loss, as captured text
    pub average_loss: &'t str,
    /// Learning rate, as captured text
    pub rate: &'t str,
    /// Byte offset of the match start
    pub start: usize,
    /// Byte offset one past the match end
    pub end: usize,
}

/// Finds every iteration anchor in a raw training log, in text order.
#[derive(Debug)]
pub struct AnchorScanner {
    pattern: Regex,
}

impl AnchorScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(ANCHOR_PATTERN).expect("anchor pattern is valid"),
        }
    }

    /// Iterate over all anchors in `text`, left to right.
    ///
    /// The iterator is lazy; in a well-formed log the text order corresponds
    /// to chronological training order.
    pub fn scan<'t>(&'t self, text: &'t str) -> impl Iterator<Item = AnchorMatch<'t>> + 't {
        self.pattern.captures_iter(text).map(|caps| {
            let (start, end) = caps
                .get(0)
                .map_or((0, 0), |m| (m.start(), m.end()));
            AnchorMatch {
                iteration: group(&caps, 1),
                loss: group(&caps, 2),
                average_loss: group(&caps, 3),
                rate: group(&caps, 4),
                start,
                end,
            }
        })
    }
}

impl Default for AnchorScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// All four headline groups are non-optional in the pattern.
fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}
