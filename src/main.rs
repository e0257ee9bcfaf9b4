use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use issue_sanitiser::{
    agent::AgentFactory,
    app::load_config,
    cli::{usage_message, validate_issue_url, Cli},
    constants::DEFAULT_LOG_LEVEL,
    prompts::ISSUE_SANITISER_AGENT,
    runtime::{Console, IssueSanitiser},
    utils::{effective_level, init_logger},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging is up before anything can fail; the configured level is
    // applied once the config is loaded
    let logger = init_logger(&effective_level(DEFAULT_LOG_LEVEL, cli.verbose));

    let issue_url = match validate_issue_url(cli.issue_url.as_deref()) {
        Ok(url) => url.to_string(),
        Err(e) => {
            if let Some(message) = usage_message(&e) {
                println!("{}", message);
            }
            std::process::exit(e.exit_code());
        }
    };

    // Load configuration, then let flags win
    let mut config = match load_config(cli.config.as_deref()).context("Failed to load configuration")
    {
        Ok(config) => config.with_overrides(cli.model.clone(), cli.base_url.clone()),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };
    config.log_level = effective_level(&config.log_level, cli.verbose);
    logger.set_level(&config.log_level);

    let client = AgentFactory::create(&config);
    let session_config = AgentFactory::session_config(&config, ISSUE_SANITISER_AGENT);
    let sanitiser = IssueSanitiser::new(client, session_config, Arc::new(Console::stdio()));

    // Start, session and send failures are logged inside `run`
    let outcome = match sanitiser.run(&issue_url).await {
        Ok(outcome) => outcome,
        Err(e) => std::process::exit(e.exit_code()),
    };

    info!(
        issue = %outcome.issue_url,
        model = %outcome.model,
        duration_ms = outcome.duration_ms as u64,
        "Run finished"
    );

    // The in-band error was already reported on stderr
    if let Some(e) = outcome.failure() {
        std::process::exit(e.exit_code());
    }

    Ok(())
}
