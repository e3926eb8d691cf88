//! Command-line front door
//!
//! Uses clap for argument parsing, dialoguer to ask for a missing question
//! and owo-colors/indicatif for terminal output.

pub mod output;

use crate::pipeline::Pipeline;
use crate::types::{AppError, Result};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::PathBuf;

/// Research crew - answers questions about cryptography and cryptocurrencies
///
/// Four roles (Planner, Searcher, Integration, Reporter) work through a
/// question in stages, consulting a local knowledge file along the way.
#[derive(Parser, Debug)]
#[command(
    name = "research-crew",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Crypto Teacher Response Generator",
    after_help = "EXAMPLES:\n    \
                  research-crew \"What is a Merkle tree?\"       # Answer one question\n    \
                  research-crew                                  # Prompt for a question\n    \
                  research-crew --file notes.txt \"...\"           # Use another knowledge file\n    \
                  research-crew serve --port 8501                # Start the web form"
)]
pub struct Cli {
    /// Question to answer (prompted for when omitted)
    pub query: Option<String>,

    /// Knowledge file consulted by the Searcher
    #[arg(short, long, env = "KNOWLEDGE_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the question form over HTTP
    Serve {
        /// Host address to bind (defaults to HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to PORT or 8501)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Ask for the question on the terminal. An empty answer is returned as-is
/// and rejected by the pipeline.
pub async fn prompt_query() -> Result<String> {
    tokio::task::spawn_blocking(|| {
        dialoguer::Input::<String>::new()
            .with_prompt("Please enter your question")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AppError::Io(format!("failed to read question: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("prompt task failed: {}", e)))?
}

/// Run the pipeline unless `cancel` resolves first.
///
/// Dropping the run future aborts the in-flight model request.
pub async fn answer_or_cancel<F>(pipeline: &Pipeline, query: &str, cancel: F) -> Result<String>
where
    F: Future<Output = ()>,
{
    tokio::select! {
        answer = pipeline.run(query) => answer,
        _ = cancel => {
            tracing::warn!("run cancelled by user");
            Err(AppError::Cancelled)
        }
    }
}
