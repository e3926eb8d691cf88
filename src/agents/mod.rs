//! Crew roles and stage execution
//!
//! - [`Role`] / [`Capability`] - static descriptors of crew members
//! - [`Crew`] - the four research roles
//! - [`StageExecutor`] - the seam between the pipeline and the model
//! - [`LlmExecutor`] - one chat completion per stage
//! - [`ManagerExecutor`] - lets a manager model reassign a stage among
//!   delegation-eligible roles before executing it

pub mod crew;
pub mod executor;
pub mod manager;
pub mod role;

use crate::types::{Result, ToolDefinition};
use async_trait::async_trait;

pub use crew::Crew;
pub use executor::LlmExecutor;
pub use manager::ManagerExecutor;
pub use role::{Capability, Role};

/// Everything an executor needs to perform one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageRequest<'a> {
    /// Stage name, for logs and errors
    pub stage: &'a str,
    /// The role the stage is declared on
    pub role: &'a Role,
    /// Fully rendered instruction
    pub instruction: &'a str,
    /// Description of the expected answer
    pub expected_output: &'a str,
    /// Resources granted to this stage
    pub tools: &'a [ToolDefinition],
}

/// Text produced by an executor, and which role produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub role: String,
    pub text: String,
}

/// Performs a single stage.
///
/// Implementations are invoked strictly one stage at a time and must be safe
/// to call again with the same request (the pipeline may retry).
#[async_trait]
pub trait StageExecutor: Send + Sync {
    async fn execute(&self, request: &StageRequest<'_>) -> Result<StageOutcome>;
}
