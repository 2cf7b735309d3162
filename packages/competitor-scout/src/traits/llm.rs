//! Completion model trait.
//!
//! The pipeline only needs plain chat completion: every stage builds its own
//! prompt, sends it, and parses the returned text itself. Providers (OpenAI,
//! compatible gateways, local models) implement this one method.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A chat message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A language model that turns a conversation into a text reply.
///
/// Must be callable concurrently; the pipeline issues up to a few calls at once.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Complete the conversation and return the assistant's text.
    async fn complete(&self, messages: &[Message], model: &str) -> Result<String>;
}

#[async_trait]
impl<T: CompletionModel + ?Sized> CompletionModel for std::sync::Arc<T> {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<String> {
        (**self).complete(messages, model).await
    }
}
