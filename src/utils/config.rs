//! Environment-based configuration
//!
//! Credentials and runtime settings are read once at startup into [`Config`],
//! validated, and passed by reference from then on. Nothing below `main`
//! reads the process environment.

use crate::types::{AppError, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Knowledge file read by the Searcher when nothing else is configured.
pub const DEFAULT_KNOWLEDGE_FILE: &str = "texto.txt";

/// Optional prompt overrides picked up from the working directory.
pub const DEFAULT_CREW_FILE: &str = "crew.toml";

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LLMConfig,
    pub server: ServerConfig,
    pub crew: CrewSettings,
}

#[derive(Clone)]
pub struct LLMConfig {
    pub api_base: String,
    pub api_key: String,
    pub model_name: String,
    /// Model used by the manager in the hierarchical process
    pub manager_model_name: String,
    pub temperature: f32,
}

// Keeps the key out of logs and panic messages.
impl fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LLMConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("manager_model_name", &self.manager_model_name)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct CrewSettings {
    pub process: Process,
    pub knowledge_file: PathBuf,
    pub stage_timeout: Duration,
    pub max_stage_attempts: u32,
    /// Path of an optional `crew.toml` with prompt overrides
    pub crew_file: PathBuf,
}

/// How stages are assigned to roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Process {
    /// Every stage is executed by the role it declares.
    Sequential,
    /// A manager model may reassign a stage to another delegation-eligible role.
    Hierarchical,
}

impl FromStr for Process {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(Process::Sequential),
            "hierarchical" => Ok(Process::Hierarchical),
            other => Err(AppError::Configuration(format!(
                "CREW_PROCESS must be 'sequential' or 'hierarchical', got '{}'",
                other
            ))),
        }
    }
}

impl Config {
    /// Load from the process environment, honouring a `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Tests use this instead of mutating
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            optional(key).ok_or_else(|| AppError::Configuration(format!("{} is not set", key)))
        };

        let api_base = required("API_BASE")?;
        validate_api_base(&api_base)?;
        let api_key = required("API_KEY")?;
        let model_name = required("MODEL_NAME")?;
        let manager_model_name =
            optional("MANAGER_MODEL_NAME").unwrap_or_else(|| model_name.clone());

        let temperature: f32 = parse_or("LLM_TEMPERATURE", optional("LLM_TEMPERATURE"), 0.0)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Configuration(format!(
                "LLM_TEMPERATURE must be between 0 and 2, got {}",
                temperature
            )));
        }

        let process = match optional("CREW_PROCESS") {
            Some(value) => value.parse()?,
            None => Process::Hierarchical,
        };

        let stage_timeout_secs: u64 =
            parse_or("STAGE_TIMEOUT_SECS", optional("STAGE_TIMEOUT_SECS"), 120)?;
        if stage_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "STAGE_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let max_stage_attempts: u32 =
            parse_or("MAX_STAGE_ATTEMPTS", optional("MAX_STAGE_ATTEMPTS"), 1)?;
        if max_stage_attempts == 0 {
            return Err(AppError::Configuration(
                "MAX_STAGE_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            llm: LLMConfig {
                api_base,
                api_key,
                model_name,
                manager_model_name,
                temperature,
            },
            server: ServerConfig {
                host: optional("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
                port: parse_or("PORT", optional("PORT"), 8501)?,
            },
            crew: CrewSettings {
                process,
                knowledge_file: optional("KNOWLEDGE_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_KNOWLEDGE_FILE)),
                stage_timeout: Duration::from_secs(stage_timeout_secs),
                max_stage_attempts,
                crew_file: optional("CREW_CONFIG")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CREW_FILE)),
            },
        })
    }
}

fn validate_api_base(api_base: &str) -> Result<()> {
    let url = reqwest::Url::parse(api_base)
        .map_err(|e| AppError::Configuration(format!("API_BASE is not a valid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::Configuration(format!(
            "API_BASE must use http or https, got '{}'",
            scheme
        ))),
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Configuration(format!("{} is invalid ('{}'): {}", key, raw, e))),
        None => Ok(default),
    }
}
