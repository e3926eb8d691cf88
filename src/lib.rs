//! # research-crew
//!
//! A small crew of language-model roles that answers questions about
//! cryptography and cryptocurrencies in four stages:
//!
//! 1. **Plan** - the Planner breaks the question into sub-questions
//! 2. **Search** - the Searcher researches them, starting from a local
//!    knowledge file
//! 3. **Integrate** - the Integration role organizes the findings
//! 4. **Report** - the Reporter writes the final answer with references
//!
//! Each stage sees the question and the outputs of the stages it depends on.
//! The final stage's text is the answer.
//!
//! ## Library usage
//!
//! ```rust,ignore
//! use research_crew::{pipeline::research, utils::config::Config};
//!
//! #[tokio::main]
//! async fn main() -> research_crew::Result<()> {
//!     let config = Config::from_env()?;
//!     let pipeline = research::from_config(&config)?;
//!     println!("{}", pipeline.run("What is a Merkle tree?").await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom executors
//!
//! The model sits behind [`StageExecutor`]; tests and embedders can supply
//! their own implementation and keep the pipeline's ordering, timeout and
//! error handling:
//!
//! ```rust,ignore
//! let stages = research::research_stages(&Crew::research(), &CrewFile::default())?;
//! let pipeline = Pipeline::new(stages, Arc::new(MyExecutor), PipelineOptions::default())?;
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - Roles, the research crew and stage executors
//! - [`api`] - The web form
//! - [`cli`] - Command-line parsing and terminal output
//! - [`llm`] - OpenAI-compatible chat client
//! - [`pipeline`] - Stages, ordering and the run loop
//! - [`tools`] - The knowledge file resource
//! - [`types`] - Shared result types and errors
//! - [`utils`] - Environment and `crew.toml` configuration

#![warn(rustdoc::missing_crate_level_docs)]

/// Crew roles and stage execution.
pub mod agents;
/// Web form handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM client implementations.
pub mod llm;
/// The staged research pipeline.
pub mod pipeline;
/// Resources granted to roles.
pub mod tools;
/// Common types and error handling.
pub mod types;
/// Configuration loading.
pub mod utils;

pub use agents::{Capability, Crew, LlmExecutor, ManagerExecutor, Role, StageExecutor};
pub use api::handlers::form::Pages;
pub use llm::{LLMClient, OpenAIClient};
pub use pipeline::{Pipeline, PipelineOptions, Stage};
pub use tools::FileResource;
pub use types::{AppError, PipelineOutput, Result, StageResult};
pub use utils::config::Config;

use std::sync::Arc;

/// Shared state for the web form.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline shared by every request
    pub pipeline: Arc<Pipeline>,
    /// Compiled HTML page
    pub pages: Arc<Pages>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Result<Self> {
        Ok(Self {
            pipeline,
            pages: Arc::new(Pages::new()?),
        })
    }
}
