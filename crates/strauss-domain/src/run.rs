//! Run identity and persisted run metadata

use crate::usage::UsageBreakdown;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a pipeline run, based on UUIDv7.
///
/// UUIDv7 keeps run ids chronologically sortable, which makes archived
/// run metadata easy to order without a separate counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(uuid::Uuid);

impl RunId {
    /// Generate a fresh UUIDv7-based run id.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse a run id from its string form.
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("invalid run id: {}", e))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Usage attributed to one executed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageUsage {
    /// Stage name (the stage's artifact key)
    pub stage: String,

    /// Usage delta accrued while the stage ran
    pub usage: UsageBreakdown,
}

/// Per-run metadata persisted once at run completion.
///
/// `stages` holds one record per stage that made generation calls, in
/// execution order; skipped stages and stages without generation calls
/// record nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Identifier for this run
    pub run_id: RunId,

    /// Unix seconds when the run started
    pub started_at: u64,

    /// Unix seconds when the run reached the terminal stage
    pub finished_at: u64,

    /// Ordered per-stage usage deltas
    pub stages: Vec<StageUsage>,

    /// Cumulative usage across the whole run
    pub totals: UsageBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageStats;

    #[test]
    fn test_run_id_round_trips_through_string() {
        let id = RunId::new();
        let parsed = RunId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_run_id_rejects_garbage() {
        assert!(RunId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_run_ids_sort_chronologically() {
        let a = RunId::new();
        let b = RunId::new();
        assert!(a <= b);
    }

    #[test]
    fn test_run_meta_serializes_stage_order() {
        let meta = RunMeta {
            run_id: RunId::new(),
            started_at: 1,
            finished_at: 2,
            stages: vec![
                StageUsage {
                    stage: "open_code".into(),
                    usage: UsageBreakdown::from_usage(UsageStats::new(10, 5), 0.002, 0.006),
                },
                StageUsage {
                    stage: "axial".into(),
                    usage: UsageBreakdown::from_usage(UsageStats::new(4, 2), 0.002, 0.006),
                },
            ],
            totals: UsageBreakdown::from_usage(UsageStats::new(14, 7), 0.002, 0.006),
        };
        let value = serde_json::to_value(&meta).unwrap();
        let stages = value["stages"].as_array().unwrap();
        assert_eq!(stages[0]["stage"], "open_code");
        assert_eq!(stages[1]["stage"], "axial");
    }
}
