//! Strauss Generation-Service Layer
//!
//! Pluggable text-generation providers behind the `TextGenerator` trait
//! from `strauss-domain`, plus the call plumbing every stage shares: the
//! retry policy and the optional token-bucket rate limiter.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic scripted provider for testing
//! - `OpenAiCompatibleProvider`: any service speaking the OpenAI
//!   chat-completions protocol
//!
//! # Examples
//!
//! ```
//! use strauss_domain::traits::TextGenerator;
//! use strauss_domain::{ChatMessage, GenerationRequest};
//! use strauss_llm::MockProvider;
//!
//! let provider = MockProvider::new("Hello from the model");
//! let request = GenerationRequest::new(vec![ChatMessage::user("hi")]);
//! let completion = provider.generate(&request).unwrap();
//! assert_eq!(completion.text, "Hello from the model");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod limiter;
pub mod openai;
pub mod retry;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use strauss_domain::traits::TextGenerator;
use strauss_domain::{Completion, GenerationRequest, UsageStats};
use thiserror::Error;

pub use config::{make_provider, Provider, ProviderConfig, ProviderKind};
pub use limiter::TokenBucket;
pub use openai::OpenAiCompatibleProvider;
pub use retry::{generate_with_retry, RetryError, RetryPolicy};

/// Errors that can occur during generation-service operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The service returned a non-success status
    #[error("API error (status {status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The service replied but the reply could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider configuration is incomplete or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error (used by the mock provider's scripted failures)
    #[error("LLM error: {0}")]
    Other(String),
}

/// One scripted mock reply.
#[derive(Debug, Clone)]
enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// Mock generation provider for deterministic testing.
///
/// Replies are served from a FIFO script; once the script is exhausted the
/// default response is returned for every further call. Scripted failures
/// let retry and halting behavior be exercised without a network.
///
/// # Examples
///
/// ```
/// use strauss_domain::traits::TextGenerator;
/// use strauss_domain::{ChatMessage, GenerationRequest};
/// use strauss_llm::MockProvider;
///
/// let provider = MockProvider::new("default");
/// provider.push_response("first");
/// provider.push_failure("boom");
///
/// let request = GenerationRequest::new(vec![ChatMessage::user("x")]);
/// assert_eq!(provider.generate(&request).unwrap().text, "first");
/// assert!(provider.generate(&request).is_err());
/// assert_eq!(provider.generate(&request).unwrap().text, "default");
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    per_call_usage: UsageStats,
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    call_count: Arc<Mutex<usize>>,
    total_usage: Arc<Mutex<UsageStats>>,
}

impl MockProvider {
    /// Create a provider that answers every call with a fixed response.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            per_call_usage: UsageStats::default(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            total_usage: Arc::new(Mutex::new(UsageStats::default())),
        }
    }

    /// Bill the given usage on every successful call.
    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.per_call_usage = UsageStats::new(input_tokens, output_tokens);
        self
    }

    /// Queue a scripted response, served before the default.
    pub fn push_response(&self, text: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Text(text.into()));
    }

    /// Queue a scripted failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Failure(message.into()));
    }

    /// Number of times `generate` was called (including failures).
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call counter.
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl TextGenerator for MockProvider {
    type Error = LlmError;

    fn generate(&self, _request: &GenerationRequest) -> Result<Completion, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        let scripted = self.script.lock().unwrap().pop_front();
        let text = match scripted {
            Some(ScriptedReply::Failure(message)) => return Err(LlmError::Other(message)),
            Some(ScriptedReply::Text(text)) => text,
            None => self.default_response.clone(),
        };

        self.total_usage.lock().unwrap().add(self.per_call_usage);
        Ok(Completion {
            text,
            usage: self.per_call_usage,
        })
    }

    fn total_usage(&self) -> UsageStats {
        *self.total_usage.lock().unwrap()
    }

    fn reset_usage(&self) {
        *self.total_usage.lock().unwrap() = UsageStats::default();
    }
}
