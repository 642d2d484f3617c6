//! Dispatch pipeline
//!
//! Runs the stages strictly in order: identify the caller, dispatch the
//! commands, locate the run the dispatch started, wait for it to complete,
//! fetch its logs and extract the command output. Every stage hands its
//! result to the next one; the first failure ends the pipeline.

pub mod dispatch;
pub mod locate;
pub mod logs;
pub mod wait;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use relay_client::ActionsApi;
use relay_core::domain::command::CommandBatch;
use relay_core::domain::output::OutputBlock;
use relay_core::domain::run::{RunHandle, run_name};
use relay_core::domain::token::CorrelationToken;
use relay_core::extract::{ExtractError, extract_output};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{Config, DISPATCH_EVENT};
use crate::error::PipelineError;
use crate::report;
use locate::LocateQuery;

/// Race `fut` against `shutdown`
pub(crate) async fn cancellable<F: Future>(
    shutdown: &CancellationToken,
    fut: F,
) -> Result<F::Output, PipelineError> {
    shutdown
        .run_until_cancelled(fut)
        .await
        .ok_or(PipelineError::Cancelled)
}

/// Result of a successful pipeline run
#[derive(Debug)]
pub struct Outcome {
    /// Login the dispatch was sent as
    pub user: String,
    pub token: CorrelationToken,
    /// The run in its completed state
    pub run: RunHandle,
    pub output: OutputBlock,
}

pub struct Pipeline<'a, A: ActionsApi + ?Sized> {
    api: &'a A,
    config: &'a Config,
    shutdown: CancellationToken,
}

impl<'a, A: ActionsApi + ?Sized> Pipeline<'a, A> {
    pub fn new(api: &'a A, config: &'a Config, shutdown: CancellationToken) -> Self {
        Self {
            api,
            config,
            shutdown,
        }
    }

    /// Run the pipeline for `commands` under a fresh correlation token
    pub async fn run(&self, commands: CommandBatch) -> Result<Outcome, PipelineError> {
        self.run_with_token(CorrelationToken::generate(), commands)
            .await
    }

    pub async fn run_with_token(
        &self,
        token: CorrelationToken,
        commands: CommandBatch,
    ) -> Result<Outcome, PipelineError> {
        let config = self.config;
        let repository = &config.repository;

        let user = cancellable(&self.shutdown, self.api.authenticated_user())
            .await?
            .map_err(PipelineError::Authentication)?;
        info!(user = %user.login, "Authenticated");

        report::banner("DISPATCH REQUEST");
        dispatch::submit(
            self.api,
            repository,
            &config.event_type,
            token,
            commands,
            &self.shutdown,
        )
        .await?;

        let name = run_name(&config.run_name_prefix, &token);
        let query = LocateQuery {
            repository,
            workflow: &config.workflow,
            actor: &user.login,
            event: DISPATCH_EVENT,
            run_name: &name,
        };
        let located =
            locate::locate_run(self.api, &query, &config.locate_policy(), &self.shutdown).await?;
        report::run_located(&user.login, &token, &located);

        let run = wait::await_completion(
            self.api,
            repository,
            located.id,
            &config.wait_policy(),
            &self.shutdown,
        )
        .await?;
        report::conclusion(&run);

        let mut archive = logs::fetch_archive(
            self.api,
            repository,
            &run,
            config.log_attempt_offset,
            &self.shutdown,
        )
        .await?;

        let output = extract_output(&mut archive, &token, &config.log_entries).map_err(
            |err| match err {
                ExtractError::NotFound { token, searched } => {
                    PipelineError::OutputNotFound { token, searched }
                }
                ExtractError::Ambiguous {
                    entry,
                    token,
                    count,
                } => PipelineError::AmbiguousOutput {
                    entry,
                    token,
                    count,
                },
                ExtractError::Archive(source) => PipelineError::log_fetch(run.id, source),
            },
        )?;
        info!(entry = output.entry(), bytes = output.as_bytes().len(), "Output extracted");

        Ok(Outcome {
            user: user.login,
            token,
            run,
            output,
        })
    }
}
