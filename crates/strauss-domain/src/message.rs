//! Messages and completions exchanged with the generation service

use crate::usage::UsageStats;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Behavioral instructions for the model
    System,
    /// Content supplied on behalf of the caller
    User,
    /// A prior model reply
    Assistant,
}

impl Role {
    /// Wire-format name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message
    pub role: Role,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Abstract structured-output hint.
///
/// Providers translate this to whatever their wire format supports, or
/// ignore it; the hint never changes the contract of the reply (a string
/// that the extractor recovers JSON from).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Ask the service to emit a single JSON object/array
    JsonObject,
}

/// A single generation-service invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Ordered conversation messages
    pub messages: Vec<ChatMessage>,

    /// Optional structured-output hint
    pub response_format: Option<ResponseFormat>,
}

impl GenerationRequest {
    /// Request generation for the given messages, unstructured.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            response_format: None,
        }
    }

    /// Attach the JSON structured-output hint.
    pub fn structured(mut self) -> Self {
        self.response_format = Some(ResponseFormat::JsonObject);
        self
    }
}

/// The generation service's reply: raw text plus billed usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Raw reply text (possibly fenced, possibly prose-wrapped)
    pub text: String,

    /// Tokens billed for this call
    pub usage: UsageStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_structured_flag() {
        let request = GenerationRequest::new(vec![ChatMessage::user("hi")]).structured();
        assert_eq!(request.response_format, Some(ResponseFormat::JsonObject));
        assert!(GenerationRequest::new(vec![]).response_format.is_none());
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, Role::System);
        assert_eq!(ChatMessage::user("u").content, "u");
    }
}
