//! LLM client abstraction
//!
//! Every stage of the crew talks to the hosted model through [`LLMClient`].
//! The production implementation is [`OpenAIClient`](super::openai::OpenAIClient),
//! which speaks the OpenAI chat-completions protocol and therefore works with
//! Groq, OpenRouter, vLLM and any other compatible endpoint.

use crate::types::Result;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// Implementations must be cancel-safe: dropping a pending future abandons
/// the request without leaving shared state behind.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}
