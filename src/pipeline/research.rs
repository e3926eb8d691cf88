//! The Plan → Search → Integrate → Report pipeline

use crate::agents::crew::{INTEGRATION, PLANNER, REPORTER, SEARCHER};
use crate::agents::{Crew, LlmExecutor, ManagerExecutor, StageExecutor};
use crate::llm::OpenAIClient;
use crate::pipeline::{Pipeline, PipelineOptions, Stage};
use crate::tools::FileResource;
use crate::types::Result;
use crate::utils::config::{Config, Process};
use crate::utils::toml_config::CrewFile;
use std::sync::Arc;

pub const PLAN: &str = "Plan";
pub const SEARCH: &str = "Search";
pub const INTEGRATE: &str = "Integrate";
pub const REPORT: &str = "Report";

pub const STAGE_NAMES: [&str; 4] = [PLAN, SEARCH, INTEGRATE, REPORT];

const PLAN_TEMPLATE: &str = r#"Analyze the following question and break it down into sub-questions that together answer it.

Question: {query}

For each sub-question explain how it relates to the main question, and say in which order they should be investigated."#;

const PLAN_EXPECTED: &str = "A detailed view of the sub-questions and their relationships to the main question and how to proceed with the investigation to answer the main question";

const SEARCH_TEMPLATE: &str = r#"Research the sub-questions identified by the Planner for the question: {query}

{context}

Knowledge file contents:
{knowledge}

Start from the knowledge file. For every piece of information you report, note where it came from."#;

const SEARCH_EXPECTED: &str =
    "Specific information and sources relevant to the sub-questions identified by the Planner Agent";

const INTEGRATE_TEMPLATE: &str = r#"Organize and integrate everything gathered so far into a coherent body of knowledge that answers: {query}

{context}

Group the findings under the sub-questions they answer, resolve contradictions and keep every link and reference attached to its claim."#;

const INTEGRATE_EXPECTED: &str = "All the information gathered from the searcher agent organized and integrated with website links and references.";

const REPORT_TEMPLATE: &str = r#"Write the final answer to the user's question: {query}

{context}

Answer directly, explain any technical term you use and finish with the references and website links that support the answer."#;

const REPORT_EXPECTED: &str = "A clear, accurate, and concise response to the user, with references and website links to sources of information.";

/// The four research stages with any `crew.toml` overrides applied.
pub fn research_stages(crew: &Crew, overrides: &CrewFile) -> Result<Vec<Stage>> {
    let stage = |name: &str, role: &str, template: &str, expected: &str| -> Result<Stage> {
        let role = crew.require(role)?;
        let custom = overrides.stage(name);
        let template = custom
            .and_then(|o| o.template.clone())
            .unwrap_or_else(|| template.to_string());
        let expected = custom
            .and_then(|o| o.expected_output.clone())
            .unwrap_or_else(|| expected.to_string());
        Ok(Stage::new(name, role, template, expected))
    };

    Ok(vec![
        stage(PLAN, PLANNER, PLAN_TEMPLATE, PLAN_EXPECTED)?,
        stage(SEARCH, SEARCHER, SEARCH_TEMPLATE, SEARCH_EXPECTED)?.after([PLAN]),
        stage(INTEGRATE, INTEGRATION, INTEGRATE_TEMPLATE, INTEGRATE_EXPECTED)?
            .after([SEARCH, PLAN]),
        stage(REPORT, REPORTER, REPORT_TEMPLATE, REPORT_EXPECTED)?
            .after([INTEGRATE, SEARCH, PLAN]),
    ])
}

/// Stage executor for the configured process.
pub fn build_executor(config: &Config, crew: &Crew) -> Arc<dyn StageExecutor> {
    let llm = Arc::new(OpenAIClient::from_config(&config.llm));
    let executor: Arc<dyn StageExecutor> = Arc::new(LlmExecutor::new(llm));

    match config.crew.process {
        Process::Sequential => executor,
        Process::Hierarchical => {
            let manager = Arc::new(
                OpenAIClient::from_config(&config.llm)
                    .with_model(config.llm.manager_model_name.clone()),
            );
            Arc::new(ManagerExecutor::new(manager, crew.clone(), executor))
        }
    }
}

/// Build the research pipeline from configuration.
pub fn from_config(config: &Config) -> Result<Pipeline> {
    let overrides = CrewFile::load(&config.crew.crew_file)?;
    let crew = Crew::research();
    overrides.validate(&crew.names(), &STAGE_NAMES)?;
    let crew = crew.with_overrides(&overrides);

    let stages = research_stages(&crew, &overrides)?;
    let executor = build_executor(config, &crew);

    tracing::info!(
        process = ?config.crew.process,
        model = %config.llm.model_name,
        knowledge_file = %config.crew.knowledge_file.display(),
        "research pipeline configured"
    );

    with_executor(stages, executor, config)
}

/// Build the research pipeline around a caller-supplied executor.
pub fn with_executor(
    stages: Vec<Stage>,
    executor: Arc<dyn StageExecutor>,
    config: &Config,
) -> Result<Pipeline> {
    Pipeline::new(
        stages,
        executor,
        PipelineOptions {
            knowledge: Some(FileResource::new(config.crew.knowledge_file.clone())),
            stage_timeout: config.crew.stage_timeout,
            max_stage_attempts: config.crew.max_stage_attempts,
        },
    )
}
