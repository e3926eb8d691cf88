//! Staged research pipeline
//!
//! A [`Pipeline`] is an immutable, validated list of [`Stage`]s plus the
//! [`StageExecutor`] that performs them. Each call to [`Pipeline::run`]
//! creates a fresh [`PipelineRun`], executes the stages one at a time in
//! dependency order, and returns the final stage's text.

pub mod research;
pub mod run;
pub mod stage;
pub mod template;

pub use run::PipelineRun;
pub use stage::Stage;

use crate::agents::{StageExecutor, StageOutcome, StageRequest};
use crate::tools::FileResource;
use crate::types::{AppError, PipelineOutput, Result, StageResult, ToolDefinition};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;

/// Substituted for `{knowledge}` when a file-reading stage runs without a
/// configured knowledge file.
const NO_KNOWLEDGE: &str = "No knowledge file was provided.";

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Read for every stage whose role can read files
    pub knowledge: Option<FileResource>,
    /// Upper bound on a single attempt of a single stage
    pub stage_timeout: Duration,
    /// Total attempts per stage, including the first
    pub max_stage_attempts: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            knowledge: None,
            stage_timeout: Duration::from_secs(120),
            max_stage_attempts: 1,
        }
    }
}

pub struct Pipeline {
    /// Stages in execution order
    stages: Vec<Stage>,
    executor: Arc<dyn StageExecutor>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Validate the stage graph and fix its execution order.
    ///
    /// Stages run in a topological order of their upstream declarations;
    /// among stages that are ready at the same time, the one declared first
    /// runs first.
    pub fn new(
        stages: Vec<Stage>,
        executor: Arc<dyn StageExecutor>,
        options: PipelineOptions,
    ) -> Result<Self> {
        if options.max_stage_attempts == 0 {
            return Err(AppError::Configuration(
                "max_stage_attempts must be at least 1".to_string(),
            ));
        }
        if options.stage_timeout.is_zero() {
            return Err(AppError::Configuration(
                "stage timeout must be greater than zero".to_string(),
            ));
        }

        let stages = execution_order(stages)?;
        tracing::debug!(
            order = ?stages.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "pipeline ready"
        );

        Ok(Self {
            stages,
            executor,
            options,
        })
    }

    /// Stages in the order they will execute.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Answer a query, returning only the final stage's text.
    pub async fn run(&self, query: &str) -> Result<String> {
        self.run_detailed(query).await.map(|output| output.answer)
    }

    /// Answer a query, returning every stage result alongside the answer.
    pub async fn run_detailed(&self, query: &str) -> Result<PipelineOutput> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::EmptyQuery);
        }

        let mut run = PipelineRun::new(query);
        let span = tracing::info_span!("pipeline_run", run_id = %run.run_id);

        async move {
            let started = Instant::now();
            tracing::info!(stages = self.stages.len(), "run started");

            for stage in &self.stages {
                let result = self.run_stage(&run, stage).await?;
                run.record(result);
            }

            if let Some(last) = run.results().last() {
                if last.text.trim().is_empty() {
                    return Err(AppError::StageExecutionFailed {
                        stage: last.stage.clone(),
                        cause: "stage produced no output".to_string(),
                    });
                }
            }

            let duration_ms = started.elapsed().as_millis() as u64;
            tracing::info!(duration_ms, "run finished");
            run.into_output(duration_ms)
        }
        .instrument(span)
        .await
    }

    async fn run_stage(&self, run: &PipelineRun, stage: &Stage) -> Result<StageResult> {
        let upstream = run.upstream_results(stage)?;

        let mut tools: Vec<ToolDefinition> = Vec::new();
        let knowledge = if stage.role.can_read_file() {
            match &self.options.knowledge {
                Some(file) => {
                    tools.push(file.tool_definition());
                    Some(file.read_or_describe().await)
                }
                None => Some(NO_KNOWLEDGE.to_string()),
            }
        } else {
            None
        };

        let context = run::context_text(&upstream);
        let upstream_keys: Vec<(String, &str)> = upstream
            .iter()
            .map(|r| (stage::placeholder(&r.stage), r.text.as_str()))
            .collect();

        let mut substitutions: Vec<(&str, &str)> =
            vec![("query", run.query.as_str()), ("context", context.as_str())];
        substitutions.extend(upstream_keys.iter().map(|(k, v)| (k.as_str(), *v)));
        if let Some(text) = &knowledge {
            substitutions.push(("knowledge", text.as_str()));
        }

        let instruction = template::render(&stage.instruction_template, &substitutions);
        let request = StageRequest {
            stage: &stage.name,
            role: &stage.role,
            instruction: &instruction,
            expected_output: &stage.expected_output,
            tools: &tools,
        };

        let span = tracing::info_span!("stage", stage = %stage.name, role = %stage.role.name);
        async move {
            let started_at = Utc::now();
            let started = Instant::now();
            let mut attempts = 0;

            let outcome = loop {
                attempts += 1;
                match self.attempt(&request).await {
                    Ok(outcome) => break outcome,
                    Err(e) if e.is_retryable() && attempts < self.options.max_stage_attempts => {
                        tracing::warn!(attempt = attempts, error = %e, "stage attempt failed, retrying");
                    }
                    Err(e) => {
                        tracing::error!(attempt = attempts, error = %e, "stage failed");
                        return Err(e);
                    }
                }
            };

            let duration_ms = started.elapsed().as_millis() as u64;
            tracing::info!(
                executed_by = %outcome.role,
                attempts,
                duration_ms,
                chars = outcome.text.len(),
                "stage completed"
            );

            Ok(StageResult {
                stage: stage.name.clone(),
                role: outcome.role,
                text: outcome.text,
                started_at,
                duration_ms,
                attempts,
            })
        }
        .instrument(span)
        .await
    }

    /// One bounded attempt, with executor errors attributed to the stage.
    async fn attempt(&self, request: &StageRequest<'_>) -> Result<StageOutcome> {
        let stage = request.stage.to_string();
        match tokio::time::timeout(self.options.stage_timeout, self.executor.execute(request)).await
        {
            Err(_) => Err(AppError::StageTimeout { stage }),
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => match e {
                AppError::Configuration(_)
                | AppError::Auth(_)
                | AppError::Cancelled
                | AppError::StageExecutionFailed { .. }
                | AppError::StageTimeout { .. } => Err(e),
                other => Err(AppError::StageExecutionFailed {
                    stage,
                    cause: other.to_string(),
                }),
            },
        }
    }
}

/// Check the stage graph and return the stages in a stable topological
/// order.
fn execution_order(stages: Vec<Stage>) -> Result<Vec<Stage>> {
    if stages.is_empty() {
        return Err(AppError::Configuration(
            "a pipeline needs at least one stage".to_string(),
        ));
    }

    let mut names = HashSet::new();
    let mut placeholders = HashSet::new();
    for stage in &stages {
        if stage.name.trim().is_empty() {
            return Err(AppError::Configuration(
                "stage names must not be empty".to_string(),
            ));
        }
        if !names.insert(stage.name.as_str()) {
            return Err(AppError::Configuration(format!(
                "duplicate stage '{}'",
                stage.name
            )));
        }

        let key = stage::placeholder(&stage.name);
        if stage::RESERVED_PLACEHOLDERS.contains(&key.as_str()) {
            return Err(AppError::Configuration(format!(
                "stage name '{}' is reserved for the {{{}}} placeholder",
                stage.name, key
            )));
        }
        if !placeholders.insert(key) {
            return Err(AppError::Configuration(format!(
                "stage '{}' would share its placeholder with another stage",
                stage.name
            )));
        }
    }

    for stage in &stages {
        let mut seen = HashSet::new();
        for upstream in &stage.upstream {
            if !names.contains(upstream.as_str()) {
                return Err(AppError::Configuration(format!(
                    "stage '{}' depends on unknown stage '{}'",
                    stage.name, upstream
                )));
            }
            if !seen.insert(upstream.as_str()) {
                return Err(AppError::Configuration(format!(
                    "stage '{}' lists '{}' more than once",
                    stage.name, upstream
                )));
            }
        }
    }

    let mut pending: Vec<Option<Stage>> = stages.into_iter().map(Some).collect();
    let mut placed: HashSet<String> = HashSet::new();
    let mut ordered = Vec::with_capacity(pending.len());

    while ordered.len() < pending.len() {
        let ready = pending.iter().position(|slot| {
            slot.as_ref()
                .map(|s| s.upstream.iter().all(|u| placed.contains(u)))
                .unwrap_or(false)
        });

        let Some(index) = ready else {
            let stuck = pending
                .iter()
                .flatten()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::Configuration(format!(
                "stage dependencies form a cycle among: {}",
                stuck
            )));
        };

        if let Some(stage) = pending[index].take() {
            placed.insert(stage.name.clone());
            ordered.push(stage);
        }
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Role;

    fn stage(name: &str, upstream: &[&str]) -> Stage {
        let role = Arc::new(Role::new("r", "g", "p", Vec::new()));
        Stage::new(name, role, "{query}", "text").after(upstream.iter().copied())
    }

    fn order(stages: Vec<Stage>) -> Result<Vec<String>> {
        execution_order(stages).map(|s| s.into_iter().map(|s| s.name).collect())
    }

    #[test]
    fn test_order_follows_dependencies() {
        let names = order(vec![
            stage("Report", &["Integrate", "Search", "Plan"]),
            stage("Search", &["Plan"]),
            stage("Integrate", &["Search", "Plan"]),
            stage("Plan", &[]),
        ])
        .unwrap();
        assert_eq!(names, vec!["Plan", "Search", "Integrate", "Report"]);
    }

    #[test]
    fn test_independent_stages_keep_declaration_order() {
        let names = order(vec![
            stage("B", &[]),
            stage("A", &[]),
            stage("C", &["A"]),
        ])
        .unwrap();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let err = order(vec![
            stage("Plan", &[]),
            stage("A", &["B"]),
            stage("B", &["A"]),
        ])
        .unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref m) if m.contains("cycle") && m.contains("A")));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let err = order(vec![stage("Plan", &["Plan"])]).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_unknown_upstream_is_rejected() {
        let err = order(vec![stage("Report", &["Summarize"])]).unwrap_err();
        assert!(err.to_string().contains("unknown stage 'Summarize'"));
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let err = order(vec![stage("Plan", &[]), stage("Plan", &[])]).unwrap_err();
        assert!(err.to_string().contains("duplicate stage"));

        let err = order(vec![stage("Plan", &[]), stage("Search", &["Plan", "Plan"])]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_reserved_stage_names_are_rejected() {
        for name in ["Query", "context", " Knowledge "] {
            let err = order(vec![stage("Plan", &[]), stage(name, &["Plan"])]).unwrap_err();
            assert!(
                matches!(err, AppError::Configuration(ref m) if m.contains("reserved")),
                "{name} was accepted"
            );
        }
    }

    #[test]
    fn test_names_differing_only_in_case_are_rejected() {
        let err = order(vec![stage("Plan", &[]), stage("plan", &[])]).unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_empty_pipeline_is_rejected() {
        assert!(matches!(order(Vec::new()), Err(AppError::Configuration(_))));
    }
}
