//! Dispatch stage
//!
//! Sends the command batch with its correlation token as a single
//! `repository_dispatch` event. Never retried: a second dispatch would start
//! a second run carrying the same token.

use relay_client::ActionsApi;
use relay_core::domain::command::CommandBatch;
use relay_core::domain::repository::Repository;
use relay_core::domain::token::CorrelationToken;
use relay_core::dto::dispatch::DispatchRequest;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::cancellable;
use crate::error::PipelineError;

/// Submit the dispatch and return the request that was sent
pub async fn submit<A: ActionsApi + ?Sized>(
    api: &A,
    repository: &Repository,
    event_type: &str,
    token: CorrelationToken,
    commands: CommandBatch,
    shutdown: &CancellationToken,
) -> Result<DispatchRequest, PipelineError> {
    let request = DispatchRequest::new(event_type, token, commands);

    info!(
        %repository,
        event_type,
        %token,
        commands = request.client_payload.commands.len(),
        "Submitting repository dispatch"
    );

    cancellable(shutdown, api.dispatch(repository, &request))
        .await?
        .map_err(PipelineError::DispatchFailure)?;

    Ok(request)
}
