use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a role is allowed to do beyond answering its own instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// A supervising manager may hand this role's stage to another role.
    CanDelegate,
    /// Stages declared on this role are granted the knowledge file.
    CanReadFile,
}

/// Static descriptor of one crew member.
///
/// Roles are immutable once built and are shared between stages via `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub goal: String,
    pub persona: String,
    pub capabilities: BTreeSet<Capability>,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        goal: impl Into<String>,
        persona: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            name: name.into(),
            goal: goal.into(),
            persona: persona.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn can_delegate(&self) -> bool {
        self.has(Capability::CanDelegate)
    }

    pub fn can_read_file(&self) -> bool {
        self.has(Capability::CanReadFile)
    }

    /// System prompt the model receives when acting as this role.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.name, self.persona, self.goal
        )
    }
}
