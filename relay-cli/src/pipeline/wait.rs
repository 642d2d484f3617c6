//! Wait stage
//!
//! Re-fetches the located run until it reports `completed`. Only completion
//! is awaited here; a failed or cancelled conclusion is still a finished run
//! whose logs are worth reading.

use relay_client::ActionsApi;
use relay_core::domain::repository::Repository;
use relay_core::domain::run::RunHandle;
use relay_core::retry::{Attempt, RetryError, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, PollError};

/// Poll run `run_id` until it completes
pub async fn await_completion<A: ActionsApi + ?Sized>(
    api: &A,
    repository: &Repository,
    run_id: u64,
    policy: &RetryPolicy,
    shutdown: &CancellationToken,
) -> Result<RunHandle, PipelineError> {
    info!(run_id, "Waiting for workflow run to complete");

    let result = policy
        .run(shutdown, || async {
            match api.get_workflow_run(repository, run_id).await {
                Ok(run) => {
                    let run = RunHandle::from(run);
                    if run.is_completed() {
                        Attempt::Ready(run)
                    } else {
                        debug!(run_id, status = %run.status, "Run still active");
                        Attempt::Retry(PollError::Pending(format!(
                            "run {} is {}",
                            run_id, run.status
                        )))
                    }
                }
                Err(err) if err.is_transient() => {
                    warn!(run_id, "Transient error fetching workflow run: {}", err);
                    Attempt::Retry(PollError::Client(err))
                }
                Err(err) => Attempt::Fatal(PollError::Client(err)),
            }
        })
        .await;

    match result {
        Ok(run) => {
            info!(
                run_id,
                conclusion = ?run.conclusion(),
                "Workflow run completed"
            );
            Ok(run)
        }
        Err(RetryError::Exhausted {
            attempts,
            elapsed,
            last,
        }) => Err(PipelineError::WaitTimeout {
            run_id,
            attempts,
            elapsed,
            last,
        }),
        Err(RetryError::Fatal(source)) => Err(PipelineError::WaitFailure { run_id, source }),
        Err(RetryError::Cancelled) => Err(PipelineError::Cancelled),
    }
}
