//! OpenAI-compatible implementation of the completion trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use competitor_scout::ai::OpenAIChat;
//!
//! let llm = OpenAIChat::new("sk-...").with_base_url("https://gateway.example.com/v1");
//! let scout = CompetitorScout::new(searcher, fetcher, llm);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use openai_client::{ChatRequest, OpenAIClient, OpenAIError};

use crate::error::{Result, ScoutError};
use crate::traits::llm::{CompletionModel, Message};

/// Sampling temperature used for every pipeline call.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Completion token limit used for every pipeline call.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Chat completion over any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAIChat {
    client: OpenAIClient,
    temperature: f32,
    max_tokens: u32,
    timeout: Option<Duration>,
}

impl OpenAIChat {
    /// Create a client for api.openai.com.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_client(OpenAIClient::new(api_key))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: OpenAIClient) -> Self {
        Self {
            client,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: None,
        }
    }

    /// Set a custom base URL (gateways, proxies, compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Bound every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = self
            .client
            .with_timeout(timeout)
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

fn to_openai(message: &Message) -> openai_client::Message {
    openai_client::Message::new(message.role.as_str(), message.content.clone())
}

fn map_error(e: OpenAIError, limit: Option<Duration>) -> ScoutError {
    match (e, limit) {
        (OpenAIError::Timeout(_), Some(limit)) => ScoutError::Timeout(limit),
        (e, _) => ScoutError::Llm(Box::new(e)),
    }
}

#[async_trait]
impl CompletionModel for OpenAIChat {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<String> {
        let request = ChatRequest::new(model)
            .messages(messages.iter().map(to_openai))
            .temperature(self.temperature)
            .token_limit(self.max_tokens);

        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(|e| map_error(e, self.timeout))?;

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mapping() {
        let converted = to_openai(&Message::system("rules"));
        assert_eq!(converted, openai_client::Message::system("rules"));
    }

    #[test]
    fn test_error_mapping() {
        let err = map_error(OpenAIError::Api("429".into()), None);
        assert!(matches!(err, ScoutError::Llm(_)));

        let limit = Duration::from_secs(5);
        let err = map_error(OpenAIError::Timeout("slow".into()), Some(limit));
        assert!(matches!(err, ScoutError::Timeout(d) if d == limit));
    }
}
