//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generation provider error
    #[error("Provider error: {0}")]
    Provider(#[from] strauss_llm::LlmError),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] strauss_pipeline::PipelineError),

    /// Artifact store error
    #[error("Store error: {0}")]
    Store(#[from] strauss_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
