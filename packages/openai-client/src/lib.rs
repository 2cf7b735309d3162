//! Minimal OpenAI-compatible chat completion client
//!
//! Talks to any endpoint that implements `POST {base_url}/chat/completions`
//! (OpenAI, Azure proxies, self-hosted gateways). No domain logic lives here.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, ChatRequest, Message};
//!
//! let client = OpenAIClient::from_env()?.with_timeout(Duration::from_secs(60))?;
//!
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new("gpt-4o")
//!             .message(Message::system("Answer in JSON."))
//!             .message(Message::user("Hello!")),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    ///
    /// A trailing slash is ignored.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request made by this client.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAIError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get a response.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                OpenAIError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(OpenAIError::Api(format!(
                "OpenAI API error {}: {}",
                status, error_text
            )));
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OpenAIError::Api("No response from OpenAI".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_builder() {
        let client = OpenAIClient::new("sk-test").with_base_url("https://custom.api.com/");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url(), "https://custom.api.com");
    }

    #[tokio::test]
    async fn test_chat_completion_returns_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"ok\":true}"}}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
            })))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
        let response = client
            .chat_completion(ChatRequest::new("gpt-4").message(Message::user("hi")))
            .await
            .unwrap();

        assert_eq!(response.content, "{\"ok\":true}");
        assert_eq!(response.usage.unwrap().total_tokens, 7);
    }

    #[tokio::test]
    async fn test_chat_completion_maps_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
        let err = client
            .chat_completion(ChatRequest::new("gpt-4").message(Message::user("hi")))
            .await
            .unwrap_err();

        assert!(matches!(err, OpenAIError::Api(ref msg) if msg.contains("rate limited")));
    }

    #[tokio::test]
    async fn test_chat_completion_without_choices_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
        let result = client
            .chat_completion(ChatRequest::new("gpt-4").message(Message::user("hi")))
            .await;

        assert!(matches!(result, Err(OpenAIError::Api(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = OpenAIClient::new("sk-test")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(50))
            .unwrap();

        let result = client
            .chat_completion(ChatRequest::new("gpt-4").message(Message::user("hi")))
            .await;

        assert!(matches!(result, Err(OpenAIError::Timeout(_))));
    }
}
