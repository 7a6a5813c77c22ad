// nlsql: ask a SQL database questions in plain language
//
// Resolves configuration from the environment, connects the LLM client and
// the database, then hands control to the interactive prompt.

use anyhow::{Context, Result};
use nlsql::cli::Repl;
use nlsql::config::RuntimeConfig;
use nlsql::context::AppContext;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with the given default log level
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing("warn");

    let config = RuntimeConfig::from_env();

    println!("\n=== Configuration ===");
    for line in config.summary_lines() {
        println!("{}", line);
    }
    println!("=====================\n");

    let ctx = AppContext::build(config)
        .await
        .context("Failed to initialize the LLM client and database")?;

    if !ctx.llm.has_api_key() {
        tracing::warn!(
            provider = ctx.llm.provider_name(),
            "no API key configured; requests will be rejected"
        );
    }

    let mut repl = Repl::new().context("Failed to start the prompt")?;
    let result = repl.run(ctx.query_agent()).await;

    ctx.shutdown().await;
    result.context("Session ended with an error")
}
