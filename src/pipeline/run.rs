use crate::pipeline::Stage;
use crate::types::{AppError, PipelineOutput, Result, StageResult};
use uuid::Uuid;

/// State of a single invocation: the query and the results produced so far.
///
/// Created when a run starts and dropped when it ends; nothing carries over
/// between runs.
#[derive(Debug)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub query: String,
    results: Vec<StageResult>,
}

impl PipelineRun {
    pub fn new(query: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            query: query.to_string(),
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    pub fn result(&self, stage: &str) -> Option<&StageResult> {
        self.results.iter().find(|r| r.stage == stage)
    }

    /// Results of `stage`'s upstream stages, in declaration order.
    ///
    /// Fails with [`AppError::MissingUpstream`] if any has not completed.
    pub fn upstream_results(&self, stage: &Stage) -> Result<Vec<&StageResult>> {
        stage
            .upstream
            .iter()
            .map(|name| {
                self.result(name).ok_or_else(|| AppError::MissingUpstream {
                    stage: stage.name.clone(),
                    upstream: name.clone(),
                })
            })
            .collect()
    }

    pub fn record(&mut self, result: StageResult) {
        self.results.push(result);
    }

    pub fn into_output(self, duration_ms: u64) -> Result<PipelineOutput> {
        let answer = self
            .results
            .last()
            .map(|r| r.text.clone())
            .ok_or_else(|| AppError::Internal("run finished without results".to_string()))?;

        Ok(PipelineOutput {
            run_id: self.run_id.to_string(),
            answer,
            stages: self.results,
            duration_ms,
        })
    }
}

/// Concatenate upstream outputs, each under a header naming its stage.
pub fn context_text(upstream: &[&StageResult]) -> String {
    upstream
        .iter()
        .map(|r| format!("### {} output\n{}", r.stage, r.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Role;
    use chrono::Utc;
    use std::sync::Arc;

    fn result(stage: &str, text: &str) -> StageResult {
        StageResult {
            stage: stage.to_string(),
            role: "r".to_string(),
            text: text.to_string(),
            started_at: Utc::now(),
            duration_ms: 1,
            attempts: 1,
        }
    }

    fn stage(name: &str, upstream: &[&str]) -> Stage {
        let role = Arc::new(Role::new("r", "g", "p", Vec::new()));
        Stage::new(name, role, "{query}", "text").after(upstream.iter().copied())
    }

    #[test]
    fn test_upstream_results_follow_declaration_order() {
        let mut run = PipelineRun::new("q");
        run.record(result("Plan", "plan-A"));
        run.record(result("Search", "search-B"));

        let report = stage("Report", &["Search", "Plan"]);
        let upstream = run.upstream_results(&report).unwrap();
        let names: Vec<_> = upstream.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(names, vec!["Search", "Plan"]);

        assert_eq!(
            context_text(&upstream),
            "### Search output\nsearch-B\n\n### Plan output\nplan-A"
        );
    }

    #[test]
    fn test_missing_upstream_is_refused() {
        let mut run = PipelineRun::new("q");
        run.record(result("Plan", "plan-A"));

        let integrate = stage("Integrate", &["Search", "Plan"]);
        let err = run.upstream_results(&integrate).unwrap_err();
        match err {
            AppError::MissingUpstream { stage, upstream } => {
                assert_eq!(stage, "Integrate");
                assert_eq!(upstream, "Search");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_upstream_text_is_kept() {
        let r = result("Plan", "");
        assert_eq!(context_text(&[&r]), "### Plan output\n");
    }

    #[test]
    fn test_into_output_uses_last_result() {
        let mut run = PipelineRun::new("q");
        run.record(result("Plan", "plan-A"));
        run.record(result("Report", "report-D"));
        let id = run.run_id.to_string();

        let output = run.into_output(42).unwrap();
        assert_eq!(output.answer, "report-D");
        assert_eq!(output.run_id, id);
        assert_eq!(output.stages.len(), 2);
        assert_eq!(output.duration_ms, 42);
    }
}
