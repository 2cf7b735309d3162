//! Completion model implementations.
//!
//! Reference implementations of the `CompletionModel` trait. Users can use
//! these directly or implement their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAIChat, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
