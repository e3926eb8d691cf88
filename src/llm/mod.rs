//! LLM Provider Clients and Abstractions
//!
//! This module provides the interface the crew uses to reach the hosted model.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all clients implement
//! - [`OpenAIClient`] - Client for any OpenAI-compatible chat-completions API
//!
//! # Example
//!
//! ```ignore
//! use research_crew::llm::{LLMClient, OpenAIClient};
//!
//! let client = OpenAIClient::new(api_key, "https://api.groq.com/openai/v1".into(), "llama3-70b-8192".into());
//! let response = client.generate("What is 2+2?").await?;
//! println!("{}", response);
//! ```

/// Core LLM client trait.
pub mod client;
/// OpenAI-compatible chat-completions client.
pub mod openai;

pub use client::LLMClient;
pub use openai::OpenAIClient;
