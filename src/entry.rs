//! Structured telemetry records extracted from a training log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One per-head diagnostic reading within a single training pass.
///
/// Immutable once constructed; owned by the pass that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    /// IOU normalization factor
    pub normalizer_iou: f64,
    /// Objectness normalization factor
    pub normalizer_obj: f64,
    /// Class normalization factor
    pub normalizer_cls: f64,
    /// Average intersection-over-union for this head
    pub iou: f64,
    /// Number of ground-truth boxes matched to this head
    pub count: u64,
    /// Classification loss component
    pub class_loss: f64,
    /// IOU loss component
    pub iou_loss: f64,
    /// Total loss for this head
    pub total_loss: f64,
}

/// One coherent pass over all detection heads, keyed by head index.
///
/// Keys are unique within a pass; a repeated index overwrites the earlier
/// reading (last write wins).
pub type RegionGroup = BTreeMap<u32, RegionEntry>;

/// One parsed training iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time the record was assembled (anchor lines carry no timestamp)
    pub time: DateTime<Utc>,
    /// Iteration number from the anchor line
    pub iteration: u64,
    /// Total loss
    pub loss: f64,
    /// Running average loss
    pub average_loss: f64,
    /// Learning rate
    pub rate: f64,
    /// Region passes extracted from the span preceding this iteration's anchor
    pub region_values: Vec<RegionGroup>,
}
