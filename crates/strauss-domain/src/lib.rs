//! Strauss Domain Layer
//!
//! Core data model for the Strauss grounded-theory pipeline. This crate
//! defines the artifact schemas each stage produces, the usage/cost value
//! objects, and the trait seams behind which the generation service and
//! the artifact store live.
//!
//! ## Key Concepts
//!
//! - **Segment**: minimal addressable unit of source text, with a stable
//!   zero-padded ordinal id
//! - **Open coding**: first-pass labeling of segments with candidate codes
//! - **Codebook**: consolidated codes with definitions and higher-order
//!   groupings (themes, aggregate dimensions)
//! - **Axial triple / Theory**: condition→action→result relationships and
//!   the final core-category synthesis
//! - **UsageStats**: monotonically accumulated token counts, with
//!   per-stage deltas and linear cost estimation
//!
//! ## Architecture
//!
//! Artifacts are plain serde types: every stage output round-trips through
//! JSON, and downstream stages read prior artifacts by value. Trait
//! definitions for the generation service and the artifact store live here;
//! implementations live in `strauss-llm` and `strauss-store`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codebook;
pub mod coding;
pub mod message;
pub mod run;
pub mod segment;
pub mod theory;
pub mod traits;
pub mod usage;

// Re-exports for convenience
pub use codebook::{Codebook, CodebookEntry, GioiaView};
pub use coding::{InitialCode, OpenCodingItem, SaturationReport};
pub use message::{ChatMessage, Completion, GenerationRequest, ResponseFormat, Role};
pub use run::{RunId, RunMeta, StageUsage};
pub use segment::Segment;
pub use theory::{AxialTriple, NegativeCase, Theory};
pub use usage::{UsageBreakdown, UsageStats};
