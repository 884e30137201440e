//! Open-coding artifacts and the saturation report

use serde::{Deserialize, Serialize};

/// A single open-coding label attached to a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialCode {
    /// The candidate code label
    pub code: String,

    /// Short working definition, when the model supplied one
    #[serde(default)]
    pub definition: Option<String>,

    /// Verbatim span from the segment supporting the code
    #[serde(default)]
    pub evidence_span: Option<String>,
}

/// Open-coding output for one segment.
///
/// `seg_id` must reference a segment emitted by the segmenter; the
/// remaining fields tolerate whatever subset the model returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCodingItem {
    /// The segment this item codes
    pub seg_id: String,

    /// Verbatim in-vivo phrases lifted from the segment, in order
    #[serde(default)]
    pub in_vivo_phrases: Vec<String>,

    /// Candidate codes for the segment
    #[serde(default)]
    pub initial_codes: Vec<InitialCode>,

    /// A short analytic memo
    #[serde(default)]
    pub quick_memo: Option<String>,
}

/// Result of the saturation calculation over the open-coding stream.
///
/// `rates[i]` is the average number of newly seen codes per item over the
/// trailing `window` items (shorter at the start of the stream).
/// `saturation_seg_index` is the index at which the rate has stayed at or
/// below `threshold` for three consecutive items, or `None` when discovery
/// never stalled within the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaturationReport {
    /// Sliding window length used for the rate series
    pub window: usize,

    /// Rate at or below which discovery counts as stalled
    pub threshold: f64,

    /// Newly seen code count per item, in stream order
    pub new_counts: Vec<usize>,

    /// Windowed new-code rate per item, same length as the stream
    pub rates: Vec<f64>,

    /// Index where saturation was declared, if it was
    pub saturation_seg_index: Option<usize>,
}
