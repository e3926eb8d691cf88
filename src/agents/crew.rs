//! The four research roles
//!
//! Personas describe how each role should behave when answering questions
//! about cryptography and cryptocurrencies.

use crate::agents::role::{Capability, Role};
use crate::types::{AppError, Result};
use crate::utils::toml_config::CrewFile;
use std::sync::Arc;

pub const PLANNER: &str = "Planner";
pub const SEARCHER: &str = "Searcher";
pub const INTEGRATION: &str = "Integration";
pub const REPORTER: &str = "Reporter";

const PLANNER_PERSONA: &str = r#"You are a research strategist who has spent years teaching cryptography and blockchain technology. Faced with a broad question you break it into precise sub-questions, state how they relate to each other and decide which must be answered first. You never answer the question yourself; you produce the plan the rest of the team follows."#;

const SEARCHER_PERSONA: &str = r#"You are a meticulous researcher with a background in applied cryptography and digital-asset markets. You work through the planner's sub-questions one by one, consult the knowledge file you are given before anything else, and record where every piece of information came from. When a source is missing or unreadable you say so plainly instead of inventing content."#;

const INTEGRATION_PERSONA: &str = r#"You are an analyst who turns scattered notes into a coherent body of knowledge. You reconcile overlapping or contradictory findings, group them under the sub-questions they answer and keep every reference and link attached to the claim it supports."#;

const REPORTER_PERSONA: &str = r#"You are a science communicator who explains cryptography to curious people without a technical background. You write clear, accurate and concise answers, define jargon the first time it appears and end with references and links the reader can follow to go deeper."#;

/// The set of roles available to a pipeline.
#[derive(Debug, Clone)]
pub struct Crew {
    roles: Vec<Arc<Role>>,
}

impl Crew {
    pub fn new(roles: Vec<Role>) -> Self {
        Self {
            roles: roles.into_iter().map(Arc::new).collect(),
        }
    }

    /// Planner, Searcher, Integration and Reporter. All four may be
    /// delegated to; only the Searcher reads the knowledge file.
    pub fn research() -> Self {
        Self::new(vec![
            Role::new(
                PLANNER,
                "Streamline complex inquiries into organized, manageable components.",
                PLANNER_PERSONA,
                [Capability::CanDelegate],
            ),
            Role::new(
                SEARCHER,
                "Identify and retrieve essential data for sophisticated inquiries.",
                SEARCHER_PERSONA,
                [Capability::CanDelegate, Capability::CanReadFile],
            ),
            Role::new(
                INTEGRATION,
                "Organize and synthesize information from multiple sources",
                INTEGRATION_PERSONA,
                [Capability::CanDelegate],
            ),
            Role::new(
                REPORTER,
                "Communicate insights clearly, ensuring depth and accuracy for further exploration",
                REPORTER_PERSONA,
                [Capability::CanDelegate],
            ),
        ])
    }

    /// Apply goal/persona overrides from `crew.toml`.
    pub fn with_overrides(self, file: &CrewFile) -> Self {
        let roles = self
            .roles
            .into_iter()
            .map(|role| match file.role(&role.name) {
                Some(o) if o.goal.is_some() || o.persona.is_some() => {
                    let mut updated = (*role).clone();
                    if let Some(goal) = &o.goal {
                        updated.goal = goal.clone();
                    }
                    if let Some(persona) = &o.persona {
                        updated.persona = persona.clone();
                    }
                    Arc::new(updated)
                }
                _ => role,
            })
            .collect();
        Self { roles }
    }

    pub fn roles(&self) -> &[Arc<Role>] {
        &self.roles
    }

    pub fn names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }

    /// Look a role up by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<Arc<Role>> {
        self.roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn require(&self, name: &str) -> Result<Arc<Role>> {
        self.get(name).ok_or_else(|| {
            AppError::Configuration(format!(
                "Role '{}' is not part of the crew ({})",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Roles a manager may hand work to.
    pub fn delegates(&self) -> Vec<Arc<Role>> {
        self.roles
            .iter()
            .filter(|r| r.can_delegate())
            .cloned()
            .collect()
    }
}
