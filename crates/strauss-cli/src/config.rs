//! Configuration management for the CLI.
//!
//! The configuration file is TOML with three sections, all optional:
//!
//! ```toml
//! [provider]
//! model = "gpt-4o-mini"
//!
//! [run]
//! strategy = "dialog"
//! batch_size = 10
//!
//! [output]
//! out_dir = "output"
//! ```

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use strauss_llm::ProviderConfig;
use strauss_pipeline::PipelineConfig;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Generation provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Pipeline run settings
    #[serde(default)]
    pub run: PipelineConfig,

    /// Output location settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output location settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory artifacts are written into
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
        }
    }
}

fn default_out_dir() -> String {
    "output".to_string()
}

impl AppConfig {
    /// Default configuration file path (`~/.strauss/config.toml`).
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".strauss").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicitly given path must exist and parse. Without one, the
    /// default path is used when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.run.validate().map_err(CliError::Config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use strauss_pipeline::SegmentStrategy;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.run.batch_size, 10);
        assert_eq!(config.output.out_dir, "output");
    }

    #[test]
    fn test_default_path_is_under_home() {
        let path = AppConfig::path().unwrap();
        assert!(path.ends_with(".strauss/config.toml"));
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [provider]
            model = "local-model"
            base_url = "http://localhost:8000/v1"
            price_input_per_1k = 0.0

            [run]
            strategy = "line"
            batch_size = 4
            rate_limit_rps = 2.0

            [output]
            out_dir = "runs/pilot"
        "#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_str.as_bytes()).unwrap();

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.provider.model, "local-model");
        assert_eq!(config.run.strategy, SegmentStrategy::Line);
        assert_eq!(config.run.batch_size, 4);
        assert_eq!(config.run.rate_limit_rps, Some(2.0));
        assert_eq!(config.output.out_dir, "runs/pilot");
    }

    #[test]
    fn test_invalid_run_section_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[run]\nbatch_size = 0\n").unwrap();

        let result = AppConfig::load(file.path().to_str());
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let result = AppConfig::load(Some("/nonexistent/strauss.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
