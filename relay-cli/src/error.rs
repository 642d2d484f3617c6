//! Pipeline error types
//!
//! Every stage either hands a refined value to the next one or fails with
//! one of these. Nothing is retried at this level; the only retries happen
//! inside the locate and wait stages.

use std::time::Duration;

use relay_client::ClientError;
use relay_core::domain::token::CorrelationToken;
use thiserror::Error;

/// Reason a polling attempt did not produce a result
#[derive(Debug, Error)]
pub enum PollError {
    /// The remote system has not caught up yet
    #[error("{0}")]
    Pending(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to get authenticated user")]
    Authentication(#[source] ClientError),

    #[error("failed to create repository dispatch")]
    DispatchFailure(#[source] ClientError),

    #[error("no workflow run named {run_name} appeared after {attempts} attempt(s) in {elapsed:?}")]
    LocateTimeout {
        run_name: String,
        attempts: u32,
        elapsed: Duration,
        /// `None` when the last attempt was still in flight
        #[source]
        last: Option<PollError>,
    },

    #[error("failed to list workflow runs")]
    LocateFailure(#[source] PollError),

    #[error("workflow run {run_id} did not complete after {attempts} attempt(s) in {elapsed:?}")]
    WaitTimeout {
        run_id: u64,
        attempts: u32,
        elapsed: Duration,
        #[source]
        last: Option<PollError>,
    },

    #[error("failed to fetch workflow run {run_id}")]
    WaitFailure {
        run_id: u64,
        #[source]
        source: PollError,
    },

    #[error("failed to fetch logs of workflow run {run_id}")]
    LogFetchFailure {
        run_id: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to find output text for {token} in {searched:?}")]
    OutputNotFound {
        token: CorrelationToken,
        searched: Vec<String>,
    },

    #[error("log entry {entry} holds {count} output blocks for {token}")]
    AmbiguousOutput {
        entry: String,
        token: CorrelationToken,
        count: usize,
    },

    #[error("cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn log_fetch(
        run_id: u64,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::LogFetchFailure {
            run_id,
            source: source.into(),
        }
    }
}
