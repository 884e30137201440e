//! Strauss Pipeline
//!
//! Staged grounded-theory analysis of interview transcripts.
//!
//! # Overview
//!
//! The pipeline takes a raw transcript and works it through the classic
//! grounded-theory sequence: segmentation, open coding, codebook
//! consolidation, axial coding, selective coding, and the supporting
//! analyses (Gioia view, negative cases, saturation, final report). The
//! generating stages call an LLM through a shared retrying, rate-limited
//! path; every stage persists one JSON artifact so interrupted runs
//! resume where they stopped.
//!
//! # Architecture
//!
//! ```text
//! Transcript -> Segment -> Open Coding -> Codebook -> Axial -> Theory
//!                                                                |
//!            Report <- Saturation <- Negative Cases <- Gioia View
//! ```
//!
//! # Key Features
//!
//! - **Resumable Runs**: one artifact per stage, cached stages skipped
//! - **Tolerant Decoding**: model replies are coerced into JSON and
//!   normalized through alias tables before typed validation
//! - **Usage Accounting**: per-stage token deltas and cost estimates
//! - **Deterministic Segmentation**: stable segment ids across reruns
//!
//! # Example Usage
//!
//! ```no_run
//! use strauss_llm::{make_provider, ProviderConfig};
//! use strauss_pipeline::{PipelineConfig, Runner};
//! use strauss_store::JsonDirStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = make_provider(&ProviderConfig::default())?;
//! let store = JsonDirStore::new("output")?;
//! let config = PipelineConfig::default();
//!
//! let mut runner = Runner::new(provider, store, config)?.with_prices(0.002, 0.006);
//! let meta = runner.run_all("Interviewer: How did it start?", false)?;
//!
//! println!("Run {} used {} tokens", meta.run_id, meta.totals.total_tokens);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extract;
mod normalize;
mod prompt;
mod report;
mod runner;
mod saturation;
mod segmenter;
mod stages;


pub use config::PipelineConfig;
pub use error::PipelineError;
pub use extract::extract_json;
pub use report::build_report;
pub use runner::{Runner, Stage, RUN_META_KEY};
pub use saturation::saturation;
pub use segmenter::{
    chunk_split, segment_dialog, segment_line, segment_paragraph, segment_transcript,
    SegmentStrategy,
};
pub use stages::{
    build_axial, build_codebook, build_theory, run_open_coding, scan_negatives, StageClient,
};
