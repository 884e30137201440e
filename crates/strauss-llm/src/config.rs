//! Provider configuration and construction

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strauss_domain::traits::TextGenerator;
use strauss_domain::{Completion, GenerationRequest, UsageStats};
use tracing::info;

use crate::openai::OpenAiCompatibleProvider;
use crate::{LlmError, MockProvider};

/// Which provider implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Any endpoint speaking the OpenAI chat-completions protocol
    OpenaiCompatible,
    /// In-process scripted provider for tests and dry runs
    Mock,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::OpenaiCompatible
    }
}

/// Provider settings, usually read from the `[provider]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider implementation to use
    #[serde(default)]
    pub name: ProviderKind,
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; falls back to `OPENAI_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL; falls back to `OPENAI_BASE_URL`, then the public endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    /// Extra HTTP headers for gateways that need them
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Completion token cap per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Ask the endpoint for a JSON object response when a stage wants one
    #[serde(default = "default_structured")]
    pub structured: bool,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Price per 1000 input tokens, in dollars
    #[serde(default = "default_price_input")]
    pub price_input_per_1k: f64,
    /// Price per 1000 output tokens, in dollars
    #[serde(default = "default_price_output")]
    pub price_output_per_1k: f64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_structured() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_price_input() -> f64 {
    0.002
}

fn default_price_output() -> f64 {
    0.006
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderKind::default(),
            model: default_model(),
            api_key: None,
            base_url: None,
            extra_headers: BTreeMap::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            structured: default_structured(),
            timeout_secs: default_timeout_secs(),
            price_input_per_1k: default_price_input(),
            price_output_per_1k: default_price_output(),
        }
    }
}

/// A constructed provider, dispatching to the configured implementation.
pub enum Provider {
    /// OpenAI-protocol HTTP provider
    OpenaiCompatible(OpenAiCompatibleProvider),
    /// Scripted in-process provider
    Mock(MockProvider),
}

impl TextGenerator for Provider {
    type Error = LlmError;

    fn generate(&self, request: &GenerationRequest) -> Result<Completion, Self::Error> {
        match self {
            Provider::OpenaiCompatible(p) => p.generate(request),
            Provider::Mock(p) => p.generate(request),
        }
    }

    fn total_usage(&self) -> UsageStats {
        match self {
            Provider::OpenaiCompatible(p) => p.total_usage(),
            Provider::Mock(p) => p.total_usage(),
        }
    }

    fn reset_usage(&self) {
        match self {
            Provider::OpenaiCompatible(p) => p.reset_usage(),
            Provider::Mock(p) => p.reset_usage(),
        }
    }
}

/// Construct the provider named by the configuration.
///
/// Credential problems surface here rather than mid-run.
pub fn make_provider(config: &ProviderConfig) -> Result<Provider, LlmError> {
    match config.name {
        ProviderKind::OpenaiCompatible => {
            let provider = OpenAiCompatibleProvider::from_config(config)?;
            info!("Using OpenAI-compatible provider with model {}", config.model);
            Ok(Provider::OpenaiCompatible(provider))
        }
        ProviderKind::Mock => {
            info!("Using mock provider");
            Ok(Provider::Mock(MockProvider::new("{}")))
        }
    }
}
