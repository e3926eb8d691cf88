//! TOML prompt overrides (`crew.toml`)
//!
//! Role goals/personas and stage templates can be tuned without rebuilding:
//!
//! ```toml
//! [roles.searcher]
//! persona = "You are a blockchain analyst..."
//!
//! [stages.report]
//! expected_output = "Three paragraphs with links"
//! ```
//!
//! Keys are matched case-insensitively against role and stage names.
//! Credentials never live here; they come from the environment.

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Root of `crew.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrewFile {
    /// Overrides keyed by role name
    #[serde(default)]
    pub roles: HashMap<String, RoleOverride>,

    /// Overrides keyed by stage name
    #[serde(default)]
    pub stages: HashMap<String, StageOverride>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleOverride {
    pub goal: Option<String>,
    pub persona: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageOverride {
    pub template: Option<String>,
    pub expected_output: Option<String>,
}

impl CrewFile {
    /// Load overrides from `path`. A missing file yields the empty set.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| AppError::Configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Configuration(format!("Failed to parse TOML: {}", e)))
    }

    pub fn role(&self, name: &str) -> Option<&RoleOverride> {
        lookup(&self.roles, name)
    }

    pub fn stage(&self, name: &str) -> Option<&StageOverride> {
        lookup(&self.stages, name)
    }

    /// Reject keys that match no known role or stage, so typos are not
    /// silently ignored.
    pub fn validate(&self, role_names: &[&str], stage_names: &[&str]) -> Result<()> {
        for key in self.roles.keys() {
            if !role_names.iter().any(|n| n.eq_ignore_ascii_case(key)) {
                return Err(AppError::Configuration(format!(
                    "crew.toml overrides unknown role '{}' (known: {})",
                    key,
                    role_names.join(", ")
                )));
            }
        }
        for key in self.stages.keys() {
            if !stage_names.iter().any(|n| n.eq_ignore_ascii_case(key)) {
                return Err(AppError::Configuration(format!(
                    "crew.toml overrides unknown stage '{}' (known: {})",
                    key,
                    stage_names.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, name: &str) -> Option<&'a T> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}
