//! Configuration for pipeline runs

use serde::{Deserialize, Serialize};

use crate::segmenter::SegmentStrategy;

/// Settings for a full pipeline run, usually the `[run]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Segmentation strategy for the input transcript
    #[serde(default)]
    pub strategy: SegmentStrategy,

    /// Maximum characters per segment
    #[serde(default = "default_max_segment_chars")]
    pub max_segment_chars: usize,

    /// Segments per open-coding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts per generation call before giving up
    #[serde(default = "default_retry_max")]
    pub retry_max: u32,

    /// Base for exponential retry backoff (seconds)
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Requests per second; unset disables rate limiting
    #[serde(default)]
    pub rate_limit_rps: Option<f64>,

    /// Trailing window (in coded segments) for the saturation rate
    #[serde(default = "default_saturation_window")]
    pub saturation_window: usize,

    /// New-code rate at or below which a window counts as saturated
    #[serde(default = "default_saturation_threshold")]
    pub saturation_threshold: f64,
}

fn default_max_segment_chars() -> usize {
    800
}

fn default_batch_size() -> usize {
    10
}

fn default_retry_max() -> u32 {
    3
}

fn default_backoff_base() -> f64 {
    1.5
}

fn default_saturation_window() -> usize {
    20
}

fn default_saturation_threshold() -> f64 {
    0.05
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: SegmentStrategy::default(),
            max_segment_chars: default_max_segment_chars(),
            batch_size: default_batch_size(),
            retry_max: default_retry_max(),
            backoff_base: default_backoff_base(),
            rate_limit_rps: None,
            saturation_window: default_saturation_window(),
            saturation_threshold: default_saturation_threshold(),
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_segment_chars == 0 {
            return Err("max_segment_chars must be greater than 0".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.retry_max == 0 {
            return Err("retry_max must be greater than 0".to_string());
        }
        if self.backoff_base < 0.0 {
            return Err("backoff_base must not be negative".to_string());
        }
        if let Some(rps) = self.rate_limit_rps {
            if rps <= 0.0 {
                return Err("rate_limit_rps must be greater than 0".to_string());
            }
        }
        if self.saturation_window == 0 {
            return Err("saturation_window must be greater than 0".to_string());
        }
        if self.saturation_threshold < 0.0 {
            return Err("saturation_threshold must not be negative".to_string());
        }
        Ok(())
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}
