//! Error types for the pipeline

use strauss_llm::RetryError;
use thiserror::Error;

/// Errors that can occur while running the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A generating stage gave up after its retry budget
    #[error("LLM error: {0}")]
    ExhaustedRetries(#[from] RetryError),

    /// Model reply could not be coerced into JSON
    #[error("Unparsable model output (first 800 chars): {excerpt}")]
    UnparsableOutput {
        /// Leading characters of the raw reply
        excerpt: String,
    },

    /// Normalized model reply did not match the expected schema
    #[error("{what} validation failed: {detail}\nModel raw (first 800 chars): {excerpt}")]
    SchemaValidation {
        /// Which artifact was being decoded
        what: String,
        /// Decode failure detail
        detail: String,
        /// Leading characters of the raw reply
        excerpt: String,
    },

    /// Artifact store error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
