//! OpenAI-compatible chat-completions provider
//!
//! Works against any service that speaks the OpenAI chat protocol (OpenAI
//! itself, Azure-style gateways, local servers). The request timeout lives
//! here at the provider boundary; retries belong to the retrying caller.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strauss_domain::traits::TextGenerator;
use strauss_domain::{ChatMessage, Completion, GenerationRequest, ResponseFormat, UsageStats};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::LlmError;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider for OpenAI-protocol chat-completions endpoints.
pub struct OpenAiCompatibleProvider {
    base_url: String,
    model: String,
    api_key: String,
    extra_headers: Vec<(String, String)>,
    temperature: f64,
    max_tokens: u32,
    structured: bool,
    client: reqwest::blocking::Client,
    total_usage: Mutex<UsageStats>,
}

/// Request body for the chat-completions endpoint
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
}

#[derive(Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response body from the chat-completions endpoint
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from configuration.
    ///
    /// Credentials resolve from the config first, then the environment
    /// (`OPENAI_API_KEY`, `OPENAI_BASE_URL`). A missing key fails here,
    /// before any stage executes.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                LlmError::Config(
                    "no API key configured; set provider.api_key or OPENAI_API_KEY".to_string(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            model: config.model.clone(),
            api_key,
            extra_headers: config
                .extra_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            structured: config.structured,
            client,
            total_usage: Mutex::new(UsageStats::default()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn wire_format(&self, request: &GenerationRequest) -> Option<WireResponseFormat> {
        match request.response_format {
            Some(ResponseFormat::JsonObject) if self.structured => {
                Some(WireResponseFormat { kind: "json_object" })
            }
            _ => None,
        }
    }
}

impl TextGenerator for OpenAiCompatibleProvider {
    type Error = LlmError;

    fn generate(&self, request: &GenerationRequest) -> Result<Completion, Self::Error> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: self.wire_format(request),
        };

        let mut http = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body);
        for (name, value) in &self.extra_headers {
            http = http.header(name.as_str(), value.as_str());
        }

        let response = http
            .send()
            .map_err(|e| LlmError::Communication(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {}", e)))?;

        // Usage is best-effort: a gateway that omits it bills as zero
        // rather than failing the call.
        let wire_usage = parsed.usage.unwrap_or_default();
        let usage = UsageStats::new(wire_usage.prompt_tokens, wire_usage.completion_tokens);
        self.total_usage.lock().unwrap().add(usage);

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                LlmError::InvalidResponse("response contained no message content".to_string())
            })?;

        debug!(
            "Completion received: {} chars, {} input / {} output tokens",
            text.len(),
            usage.input_tokens,
            usage.output_tokens
        );

        Ok(Completion { text, usage })
    }

    fn total_usage(&self) -> UsageStats {
        *self.total_usage.lock().unwrap()
    }

    fn reset_usage(&self) {
        *self.total_usage.lock().unwrap() = UsageStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    fn config_with_key() -> ProviderConfig {
        ProviderConfig {
            name: ProviderKind::OpenaiCompatible,
            api_key: Some("sk-test".to_string()),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let config = ProviderConfig {
            api_key: None,
            ..ProviderConfig::default()
        };
        // Only meaningful when the environment carries no key.
        if std::env::var("OPENAI_API_KEY").is_err() {
            let result = OpenAiCompatibleProvider::from_config(&config);
            assert!(matches!(result, Err(LlmError::Config(_))));
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = ProviderConfig {
            base_url: Some("http://localhost:8000/v1/".to_string()),
            ..config_with_key()
        };
        let provider = OpenAiCompatibleProvider::from_config(&config).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_structured_hint_respects_config_toggle() {
        let mut config = config_with_key();
        config.base_url = Some("http://localhost:8000/v1".to_string());
        config.structured = false;
        let provider = OpenAiCompatibleProvider::from_config(&config).unwrap();

        let request = GenerationRequest::new(vec![ChatMessage::user("x")]).structured();
        assert!(provider.wire_format(&request).is_none());

        config.structured = true;
        let provider = OpenAiCompatibleProvider::from_config(&config).unwrap();
        assert!(provider.wire_format(&request).is_some());
        assert!(provider
            .wire_format(&GenerationRequest::new(vec![]))
            .is_none());
    }

    #[test]
    fn test_unreachable_endpoint_is_communication_error() {
        let config = ProviderConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: 1,
            ..config_with_key()
        };
        let provider = OpenAiCompatibleProvider::from_config(&config).unwrap();
        let request = GenerationRequest::new(vec![ChatMessage::user("x")]);

        let result = provider.generate(&request);
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[test]
    fn test_usage_parses_with_missing_fields() {
        let json = r#"{"choices":[{"message":{"content":"hi"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let usage = parsed.usage.unwrap_or_default();
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.completion_tokens, 0);
    }
}
