use crate::agents::Role;
use std::sync::Arc;

/// Placeholders filled by the pipeline itself. No stage may be named so that
/// its own placeholder shadows one of these.
pub const RESERVED_PLACEHOLDERS: [&str; 3] = ["query", "context", "knowledge"];

/// Placeholder under which a stage's output is available downstream.
pub fn placeholder(stage_name: &str) -> String {
    stage_name.trim().to_lowercase()
}

/// One unit of pipeline work bound to a role.
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub role: Arc<Role>,
    /// Template rendered with `{query}`, `{context}`, `{knowledge}` and one
    /// `{<stage>}` placeholder per upstream stage (lowercased name)
    pub instruction_template: String,
    pub expected_output: String,
    /// Stages whose results this stage reads, in the order they are
    /// concatenated into `{context}`
    pub upstream: Vec<String>,
}

impl Stage {
    pub fn new(
        name: impl Into<String>,
        role: Arc<Role>,
        instruction_template: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            instruction_template: instruction_template.into(),
            expected_output: expected_output.into(),
            upstream: Vec::new(),
        }
    }

    /// Declare the stages this one depends on.
    pub fn after<I, S>(mut self, upstream: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upstream = upstream.into_iter().map(Into::into).collect();
        self
    }

}
