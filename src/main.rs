//! research-crew entry point
//!
//! - `research-crew [QUERY]` - answer one question on the terminal
//! - `research-crew serve` - serve the question form over HTTP

use research_crew::{
    api::routes::create_router,
    cli::{self, output::Output, Cli, Commands},
    pipeline::research,
    AppError, AppState, Config, Pipeline, Result,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    init_tracing(cli.verbose);

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "research_crew=debug,tower_http=debug"
    } else {
        "research_crew=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(file) = cli.file {
        config.crew.knowledge_file = file;
    }

    let pipeline = research::from_config(&config)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(Arc::new(pipeline), &host, port, output).await
        }
        None => {
            output.banner();
            let query = match cli.query {
                Some(query) => query,
                None => cli::prompt_query().await?,
            };

            let spinner = output.spinner("Researching...");
            let result = cli::answer_or_cancel(&pipeline, &query, async {
                // A failed signal listener must not look like a cancellation.
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            })
            .await;
            spinner.finish_and_clear();

            let answer = result?;
            output.answer(&answer);
            Ok(())
        }
    }
}

async fn serve(pipeline: Arc<Pipeline>, host: &str, port: u16, output: &Output) -> Result<()> {
    let state = AppState::new(pipeline)?;
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Configuration(format!("Failed to bind {}: {}", addr, e)))?;

    output.success(&format!("Serving the question form on http://{}", addr));
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .map_err(|e| AppError::Internal(format!("server error: {}", e)))
}
