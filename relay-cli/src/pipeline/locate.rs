//! Locate stage
//!
//! The dispatch call returns no run reference and the run shows up in the
//! listing only after a propagation delay. The listing is polled until a
//! run carrying the token in its name appears.

use relay_client::ActionsApi;
use relay_core::domain::repository::Repository;
use relay_core::domain::run::RunHandle;
use relay_core::dto::run::RunFilter;
use relay_core::retry::{Attempt, RetryError, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, PollError};

/// What to list and which run name to look for
#[derive(Debug, Clone)]
pub struct LocateQuery<'a> {
    pub repository: &'a Repository,
    /// Workflow file the dispatch triggers
    pub workflow: &'a str,
    /// Login of the account that sent the dispatch
    pub actor: &'a str,
    /// Trigger event kind
    pub event: &'a str,
    /// Exact display name of the run, derived from the token
    pub run_name: &'a str,
}

/// Poll the run listing until the run named in `query` appears
///
/// The first matching run in listing order wins.
pub async fn locate_run<A: ActionsApi + ?Sized>(
    api: &A,
    query: &LocateQuery<'_>,
    policy: &RetryPolicy,
    shutdown: &CancellationToken,
) -> Result<RunHandle, PipelineError> {
    let filter = RunFilter {
        actor: Some(query.actor.to_string()),
        event: Some(query.event.to_string()),
    };

    info!(
        run_name = query.run_name,
        workflow = query.workflow,
        "Waiting for dispatched run to be listed"
    );

    let result = policy
        .run(shutdown, || async {
            match api
                .list_workflow_runs(query.repository, query.workflow, &filter)
                .await
            {
                Ok(runs) => {
                    let listed = runs.len();
                    match runs.into_iter().find(|run| run.is_named(query.run_name)) {
                        Some(run) => Attempt::Ready(RunHandle::from(run)),
                        None => {
                            debug!(listed, "Dispatched run not listed yet");
                            Attempt::Retry(PollError::Pending(format!(
                                "not among {} listed run(s)",
                                listed
                            )))
                        }
                    }
                }
                Err(err) if err.is_transient() => {
                    warn!("Transient error listing workflow runs: {}", err);
                    Attempt::Retry(PollError::Client(err))
                }
                Err(err) => Attempt::Fatal(PollError::Client(err)),
            }
        })
        .await;

    match result {
        Ok(run) => {
            info!(run_id = run.id, status = %run.status, "Located workflow run");
            Ok(run)
        }
        Err(RetryError::Exhausted {
            attempts,
            elapsed,
            last,
        }) => Err(PipelineError::LocateTimeout {
            run_name: query.run_name.to_string(),
            attempts,
            elapsed,
            last,
        }),
        Err(RetryError::Fatal(err)) => Err(PipelineError::LocateFailure(err)),
        Err(RetryError::Cancelled) => Err(PipelineError::Cancelled),
    }
}
