//! Relay CLI
//!
//! Reads shell commands from stdin, sends them to a GitHub Actions workflow
//! through a repository dispatch, waits for the run that picks them up and
//! prints the output that run logged for them.

mod config;
mod error;
mod pipeline;
mod report;
mod signal;

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use relay_client::GitHubClient;
use relay_core::domain::command::CommandBatch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "relay", version)]
#[command(about = "Run shell commands on a GitHub Actions runner", long_about = None)]
#[command(after_help = config::ENV_HELP)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    let _cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay=info,relay_client=info,relay_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;
    debug!(?config, "Loaded configuration");

    report::prompt();
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read commands from stdin")?;
    let commands = CommandBatch::from_text(&input);
    info!(commands = commands.len(), "Read command batch");

    let client =
        GitHubClient::with_timeout(config.api_url.clone(), &config.token, config.request_timeout)
        .context("Failed to create GitHub client")?
        .with_max_redirects(config.log_max_redirects);

    let shutdown = CancellationToken::new();
    let watcher = signal::spawn_watcher(shutdown.clone());

    let result = Pipeline::new(&client, &config, shutdown).run(commands).await;
    watcher.abort();

    let outcome = result?;
    info!(
        user = %outcome.user,
        token = %outcome.token,
        run_id = outcome.run.id,
        "Pipeline finished"
    );
    report::command_output(&outcome.output);

    Ok(())
}
