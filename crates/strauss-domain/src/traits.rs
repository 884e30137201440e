//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! infrastructure. Implementations live in other crates
//! (`strauss-llm`, `strauss-store`).

use crate::message::{Completion, GenerationRequest};
use crate::usage::UsageStats;
use serde_json::Value;

/// Trait for the text-generation service.
///
/// Implementations keep a cumulative usage accumulator behind interior
/// mutability so callers can snapshot totals around a stage without a
/// mutable borrow.
pub trait TextGenerator {
    /// Error type for generation operations
    type Error;

    /// Generate a completion for the given messages.
    ///
    /// Any failure is treated as transient by the retrying caller;
    /// implementations should not retry internally.
    fn generate(&self, request: &GenerationRequest) -> Result<Completion, Self::Error>;

    /// Cumulative usage across all calls since creation or the last reset.
    fn total_usage(&self) -> UsageStats;

    /// Reset the cumulative usage accumulator.
    fn reset_usage(&self);
}

/// Trait for the persisted-artifact store.
///
/// Keys are stage names; values are JSON-serializable documents. A real
/// implementation is a directory of JSON files, but any key-value store
/// qualifies since the orchestrator only ever asks these three questions.
pub trait ArtifactStore {
    /// Error type for store operations
    type Error;

    /// Whether an artifact exists under the key.
    fn exists(&self, key: &str) -> Result<bool, Self::Error>;

    /// Read the artifact stored under the key.
    fn read(&self, key: &str) -> Result<Value, Self::Error>;

    /// Write (or overwrite) the artifact under the key.
    fn write(&mut self, key: &str, value: &Value) -> Result<(), Self::Error>;
}
