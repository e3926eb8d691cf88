//! Integration tests for configuration
//!
//! These tests verify that configuration works end-to-end:
//! - Environment values reach the pipeline options
//! - `crew.toml` overrides reach the roles and stage instructions
//! - Invalid overrides are rejected before any stage runs

mod common;

use common::mocks::ScriptedExecutor;
use research_crew::agents::Crew;
use research_crew::pipeline::research::{self, research_stages, STAGE_NAMES};
use research_crew::types::AppError;
use research_crew::utils::config::{Config, Process};
use research_crew::utils::toml_config::CrewFile;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Test helper: a configuration read from the given variables on top of the
/// required ones.
fn config_with(extra: &[(&str, &str)]) -> Result<Config, AppError> {
    let mut vars: HashMap<String, String> = [
        ("API_BASE", "https://api.groq.com/openai/v1"),
        ("API_KEY", "test-api-key"),
        ("MODEL_NAME", "llama3-70b-8192"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned())
}

fn write_crew_file(dir: &Path, content: &str) -> String {
    let path = dir.join("crew.toml");
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn test_environment_reaches_pipeline_options() {
    let dir = TempDir::new().unwrap();
    let crew_file = dir.path().join("absent.toml").display().to_string();
    let config = config_with(&[
        ("STAGE_TIMEOUT_SECS", "45"),
        ("MAX_STAGE_ATTEMPTS", "2"),
        ("KNOWLEDGE_FILE", "notes/crypto.txt"),
        ("CREW_PROCESS", "sequential"),
        ("CREW_CONFIG", crew_file.as_str()),
    ])
    .unwrap();
    assert_eq!(config.crew.process, Process::Sequential);

    let pipeline = research::from_config(&config).unwrap();
    let options = pipeline.options();

    assert_eq!(options.stage_timeout, Duration::from_secs(45));
    assert_eq!(options.max_stage_attempts, 2);
    assert_eq!(
        options.knowledge.as_ref().map(|k| k.path().to_path_buf()),
        Some("notes/crypto.txt".into())
    );
}

#[test]
fn test_missing_required_variable_is_a_configuration_error() {
    let err = Config::from_lookup(|key| match key {
        "API_BASE" => Some("https://api.groq.com/openai/v1".to_string()),
        "MODEL_NAME" => Some("llama3-70b-8192".to_string()),
        _ => None,
    })
    .unwrap_err();

    assert!(matches!(err, AppError::Configuration(ref m) if m.contains("API_KEY")));
}

#[tokio::test]
async fn test_crew_file_overrides_reach_the_executor() {
    let dir = TempDir::new().unwrap();
    let crew_file = write_crew_file(
        dir.path(),
        r#"
[roles.Reporter]
persona = "You explain everything with a cooking analogy."

[stages.Report]
template = "Answer briefly: {query}\n\n{integrate}"
expected_output = "Two sentences."
"#,
    );
    let config = config_with(&[("CREW_CONFIG", crew_file.as_str())]).unwrap();

    let overrides = CrewFile::load(&config.crew.crew_file).unwrap();
    let crew = Crew::research().with_overrides(&overrides);
    let stages = research_stages(&crew, &overrides).unwrap();
    let executor = ScriptedExecutor::canned().into_arc();
    let pipeline = research::with_executor(stages, executor.clone(), &config).unwrap();

    pipeline.run("What is a hash?").await.unwrap();

    let report = executor
        .invocations()
        .into_iter()
        .find(|c| c.stage == "Report")
        .unwrap();
    assert_eq!(report.instruction, "Answer briefly: What is a hash?\n\nintegrate-C");
    assert!(report.system_prompt.contains("cooking analogy"));

    let plan = executor
        .invocations()
        .into_iter()
        .find(|c| c.stage == "Plan")
        .unwrap();
    assert!(!plan.system_prompt.contains("cooking analogy"));
}

#[test]
fn test_unknown_override_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let crew_file = write_crew_file(
        dir.path(),
        r#"
[stages.Summarize]
template = "{query}"
"#,
    );
    let config = config_with(&[("CREW_CONFIG", crew_file.as_str())]).unwrap();

    let err = research::from_config(&config).err().unwrap();
    assert!(matches!(err, AppError::Configuration(ref m) if m.contains("Summarize")));
}

#[test]
fn test_malformed_crew_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let crew_file = write_crew_file(dir.path(), "[roles.Planner\npersona = ");
    let config = config_with(&[("CREW_CONFIG", crew_file.as_str())]).unwrap();

    assert!(matches!(
        research::from_config(&config),
        Err(AppError::Configuration(_))
    ));
}

#[test]
fn test_stage_names_are_the_four_research_stages() {
    assert_eq!(STAGE_NAMES, ["Plan", "Search", "Integrate", "Report"]);
}
