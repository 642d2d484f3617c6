//! Log fetch stage
//!
//! Resolves the signed download location of a run attempt's log bundle and
//! downloads it. The location is short-lived and carries credentials in its
//! query string, so it is never logged.

use relay_client::ActionsApi;
use relay_core::archive::LogArchive;
use relay_core::domain::repository::Repository;
use relay_core::domain::run::RunHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::cancellable;
use crate::error::PipelineError;

/// Attempt number whose logs are requested, `None` when the offset leaves
/// no valid attempt
pub fn resolve_attempt(attempt: u32, offset: i64) -> Option<u32> {
    let resolved = i64::from(attempt).checked_add(offset)?;
    if resolved < 1 {
        return None;
    }
    u32::try_from(resolved).ok()
}

/// Download the log bundle of the run's attempt
pub async fn fetch_archive<A: ActionsApi + ?Sized>(
    api: &A,
    repository: &Repository,
    run: &RunHandle,
    attempt_offset: i64,
    shutdown: &CancellationToken,
) -> Result<LogArchive, PipelineError> {
    let attempt = resolve_attempt(run.attempt, attempt_offset).ok_or_else(|| {
        PipelineError::log_fetch(
            run.id,
            format!(
                "attempt offset {} leaves no valid attempt for run attempt {}",
                attempt_offset, run.attempt
            ),
        )
    })?;

    info!(run_id = run.id, attempt, "Fetching run logs");

    let url = cancellable(
        shutdown,
        api.run_attempt_logs_url(repository, run.id, attempt),
    )
    .await?
    .map_err(|e| PipelineError::log_fetch(run.id, e))?;

    let bytes = cancellable(shutdown, api.download_logs(&url))
        .await?
        .map_err(|e| PipelineError::log_fetch(run.id, e))?;

    let archive = LogArchive::from_bytes(bytes).map_err(|e| PipelineError::log_fetch(run.id, e))?;

    debug!(
        run_id = run.id,
        entries = ?archive.entry_names().collect::<Vec<_>>(),
        "Log bundle downloaded"
    );

    Ok(archive)
}
