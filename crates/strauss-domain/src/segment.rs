//! Segment - the minimal addressable unit of source text

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single unit of source text submitted to a coding step.
///
/// Segments are produced once by the segmenter and never mutated
/// afterwards; every later artifact refers back to them by `seg_id`.
/// Ids are zero-padded sequential ordinals (`"0001"`, `"0002"`, ...)
/// assigned in emission order and unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Stable zero-padded ordinal id, unique within the run
    pub seg_id: String,

    /// The segment text, bounded by the run's maximum segment size
    pub text: String,

    /// Speaker attribution when the dialog strategy produced this segment
    #[serde(default)]
    pub speaker: Option<String>,

    /// Free-form string metadata attached at segmentation time
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Segment {
    /// Create a segment with the given ordinal (1-based) and text.
    pub fn new(ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            seg_id: format!("{:04}", ordinal),
            text: text.into(),
            speaker: None,
            meta: BTreeMap::new(),
        }
    }

    /// Attach a speaker attribution.
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_zero_padded() {
        assert_eq!(Segment::new(1, "a").seg_id, "0001");
        assert_eq!(Segment::new(42, "a").seg_id, "0042");
        assert_eq!(Segment::new(12345, "a").seg_id, "12345");
    }

    #[test]
    fn test_json_round_trip() {
        let seg = Segment::new(7, "Hello there.").with_speaker("Alice");
        let json = serde_json::to_string(&seg).unwrap();
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(seg, back);
    }

    #[test]
    fn test_optional_fields_default_on_deserialize() {
        let seg: Segment = serde_json::from_str(r#"{"seg_id":"0001","text":"hi"}"#).unwrap();
        assert!(seg.speaker.is_none());
        assert!(seg.meta.is_empty());
    }
}
