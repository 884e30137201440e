//! Stage orchestration for full pipeline runs
//!
//! `Runner` drives the fixed stage order against an artifact store:
//!
//! ```text
//! segment -> open_code -> build_codebook -> axial -> theory
//!         -> gioia_view -> negatives -> saturation -> report
//! ```
//!
//! Every stage persists exactly one artifact under its own name, written
//! the moment the stage completes. A stage whose artifact already exists
//! is skipped and its artifact reused, so an interrupted run resumes from
//! the first missing stage; `force` recomputes everything. Completed
//! artifacts are never rolled back when a later stage fails.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;
use strauss_domain::traits::{ArtifactStore, TextGenerator};
use strauss_domain::{
    AxialTriple, Codebook, GioiaView, OpenCodingItem, RunId, RunMeta, Segment, StageUsage, Theory,
    UsageBreakdown, UsageStats,
};
use strauss_llm::{RetryPolicy, TokenBucket};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::report::build_report;
use crate::saturation::saturation;
use crate::segmenter::segment_transcript;
use crate::stages::{self, StageClient};

/// Store key for the per-run metadata document.
pub const RUN_META_KEY: &str = "run_meta";

/// The pipeline stages, in execution order.
///
/// A stage's name doubles as its artifact key in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Split the transcript into segments
    Segment,
    /// Open-code the segments
    OpenCode,
    /// Consolidate initial codes into the codebook
    BuildCodebook,
    /// Extract condition, action, result triples
    Axial,
    /// Synthesize the selective-coding theory
    Theory,
    /// Project the codebook into the Gioia view
    GioiaView,
    /// Scan segments for cases contradicting the storyline
    Negatives,
    /// Compute the saturation report
    Saturation,
    /// Assemble the final report
    Report,
}

impl Stage {
    /// All stages, in execution order.
    pub const ALL: [Stage; 9] = [
        Stage::Segment,
        Stage::OpenCode,
        Stage::BuildCodebook,
        Stage::Axial,
        Stage::Theory,
        Stage::GioiaView,
        Stage::Negatives,
        Stage::Saturation,
        Stage::Report,
    ];

    /// The stage's name, which is also its artifact key.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Segment => "segment",
            Stage::OpenCode => "open_code",
            Stage::BuildCodebook => "build_codebook",
            Stage::Axial => "axial",
            Stage::Theory => "theory",
            Stage::GioiaView => "gioia_view",
            Stage::Negatives => "negatives",
            Stage::Saturation => "saturation",
            Stage::Report => "report",
        }
    }
}

/// Orchestrates a full pipeline run.
///
/// Owns the generator, the store, and the run configuration. Usage is
/// attributed per stage by snapshotting the generator's cumulative
/// accumulator around each generating stage; the pure stages (segment,
/// gioia_view, saturation, report) and skipped stages record nothing.
pub struct Runner<G, S> {
    generator: G,
    store: S,
    config: PipelineConfig,
    limiter: Option<TokenBucket>,
    price_input_per_1k: f64,
    price_output_per_1k: f64,
}

impl<G, S> Runner<G, S>
where
    G: TextGenerator,
    G::Error: fmt::Display,
    S: ArtifactStore,
    S::Error: fmt::Display,
{
    /// Create a runner, validating the configuration up front.
    ///
    /// Cost estimates default to zero; set real prices with
    /// [`with_prices`](Self::with_prices).
    pub fn new(generator: G, store: S, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        let limiter = config.rate_limit_rps.map(TokenBucket::new);
        Ok(Self {
            generator,
            store,
            config,
            limiter,
            price_input_per_1k: 0.0,
            price_output_per_1k: 0.0,
        })
    }

    /// Set the per-1k-token prices used for cost estimates.
    pub fn with_prices(mut self, input_per_1k: f64, output_per_1k: f64) -> Self {
        self.price_input_per_1k = input_per_1k;
        self.price_output_per_1k = output_per_1k;
        self
    }

    /// The artifact store, for reading artifacts after a run.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run every stage in order, resuming from cached artifacts.
    ///
    /// Returns the run metadata, which is also persisted under
    /// [`RUN_META_KEY`] once the report is written.
    pub fn run_all(&mut self, input_text: &str, force: bool) -> Result<RunMeta, PipelineError> {
        let run_id = RunId::new();
        let started_at = unix_now();
        info!("Starting run {}", run_id);

        self.generator.reset_usage();
        let mut stage_usages: Vec<StageUsage> = Vec::new();

        let segments: Vec<Segment> = if self.needs_run(Stage::Segment, force)? {
            let segments =
                segment_transcript(input_text, self.config.strategy, self.config.max_segment_chars);
            info!("Segmented transcript into {} segments", segments.len());
            self.write_artifact(Stage::Segment.name(), &segments)?;
            segments
        } else {
            self.read_artifact(Stage::Segment.name())?
        };

        let open_items: Vec<OpenCodingItem> = if self.needs_run(Stage::OpenCode, force)? {
            let before = self.generator.total_usage();
            let items =
                stages::run_open_coding(&self.client(), &segments, self.config.batch_size)?;
            info!("Open coding produced {} items", items.len());
            self.write_artifact(Stage::OpenCode.name(), &items)?;
            stage_usages.push(self.stage_usage(Stage::OpenCode, before));
            items
        } else {
            self.read_artifact(Stage::OpenCode.name())?
        };

        let codebook: Codebook = if self.needs_run(Stage::BuildCodebook, force)? {
            let before = self.generator.total_usage();
            let codebook = stages::build_codebook(&self.client(), &open_items)?;
            info!("Codebook has {} entries", codebook.entries.len());
            self.write_artifact(Stage::BuildCodebook.name(), &codebook)?;
            stage_usages.push(self.stage_usage(Stage::BuildCodebook, before));
            codebook
        } else {
            self.read_artifact(Stage::BuildCodebook.name())?
        };

        let triples: Vec<AxialTriple> = if self.needs_run(Stage::Axial, force)? {
            let before = self.generator.total_usage();
            let triples = stages::build_axial(&self.client(), &codebook)?;
            info!("Extracted {} axial triples", triples.len());
            self.write_artifact(Stage::Axial.name(), &triples)?;
            stage_usages.push(self.stage_usage(Stage::Axial, before));
            triples
        } else {
            self.read_artifact(Stage::Axial.name())?
        };

        let theory: Theory = if self.needs_run(Stage::Theory, force)? {
            let before = self.generator.total_usage();
            let theory = stages::build_theory(&self.client(), &triples)?;
            info!("Core category: {}", theory.core_category);
            self.write_artifact(Stage::Theory.name(), &theory)?;
            stage_usages.push(self.stage_usage(Stage::Theory, before));
            theory
        } else {
            self.read_artifact(Stage::Theory.name())?
        };

        if self.needs_run(Stage::GioiaView, force)? {
            let view = GioiaView::from(&codebook);
            self.write_artifact(Stage::GioiaView.name(), &view)?;
        }

        if self.needs_run(Stage::Negatives, force)? {
            let before = self.generator.total_usage();
            let negatives = stages::scan_negatives(&self.client(), &segments, &theory.storyline)?;
            info!("Flagged {} negative cases", negatives.len());
            self.write_artifact(Stage::Negatives.name(), &negatives)?;
            stage_usages.push(self.stage_usage(Stage::Negatives, before));
        }

        if self.needs_run(Stage::Saturation, force)? {
            let sat = saturation(
                &open_items,
                self.config.saturation_window,
                self.config.saturation_threshold,
            );
            match sat.saturation_seg_index {
                Some(index) => info!("Discovery saturated at segment index {}", index),
                None => info!("Discovery did not saturate within the stream"),
            }
            self.write_artifact(Stage::Saturation.name(), &sat)?;
        }

        if self.needs_run(Stage::Report, force)? {
            let report = build_report(&segments, &open_items, &codebook, &triples, &theory);
            self.write_artifact(Stage::Report.name(), &report)?;
        }

        let totals = UsageBreakdown::from_usage(
            self.generator.total_usage(),
            self.price_input_per_1k,
            self.price_output_per_1k,
        );
        let meta = RunMeta {
            run_id,
            started_at,
            finished_at: unix_now(),
            stages: stage_usages,
            totals,
        };
        self.write_artifact(RUN_META_KEY, &meta)?;
        info!("Run {} complete", run_id);

        Ok(meta)
    }

    /// Whether the stage must execute, logging the skip when it won't.
    fn needs_run(&self, stage: Stage, force: bool) -> Result<bool, PipelineError> {
        if force {
            return Ok(true);
        }
        let cached = self
            .store
            .exists(stage.name())
            .map_err(|e| PipelineError::Store(e.to_string()))?;
        if cached {
            info!("Stage '{}' already has an artifact, skipping", stage.name());
        }
        Ok(!cached)
    }

    fn read_artifact<T: DeserializeOwned>(&self, key: &str) -> Result<T, PipelineError> {
        let value = self
            .store
            .read(key)
            .map_err(|e| PipelineError::Store(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| {
            PipelineError::Store(format!("cached artifact '{}' could not be decoded: {}", key, e))
        })
    }

    fn write_artifact<T: Serialize>(&mut self, key: &str, artifact: &T) -> Result<(), PipelineError> {
        let value = serde_json::to_value(artifact).map_err(|e| {
            PipelineError::Store(format!("artifact '{}' could not be serialized: {}", key, e))
        })?;
        self.store
            .write(key, &value)
            .map_err(|e| PipelineError::Store(e.to_string()))
    }

    fn client(&self) -> StageClient<'_, G> {
        StageClient::new(
            &self.generator,
            RetryPolicy::new(self.config.retry_max, self.config.backoff_base),
            self.limiter.as_ref(),
        )
    }

    fn stage_usage(&self, stage: Stage, before: UsageStats) -> StageUsage {
        let delta = self.generator.total_usage().delta_since(before);
        StageUsage {
            stage: stage.name().to_string(),
            usage: UsageBreakdown::from_usage(
                delta,
                self.price_input_per_1k,
                self.price_output_per_1k,
            ),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strauss_llm::MockProvider;
    use strauss_store::MemoryStore;

    #[test]
    fn test_stage_names_are_unique_keys() {
        let names: HashSet<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), Stage::ALL.len());
        assert!(!names.contains(RUN_META_KEY));
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::ALL[0], Stage::Segment);
        assert_eq!(Stage::ALL[1].name(), "open_code");
        assert_eq!(Stage::ALL[8], Stage::Report);
    }

    #[test]
    fn test_runner_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.batch_size = 0;

        let result = Runner::new(MockProvider::new("{}"), MemoryStore::new(), config);
        match result {
            Err(PipelineError::Config(message)) => assert!(message.contains("batch_size")),
            _ => panic!("expected a configuration error"),
        }
    }
}
