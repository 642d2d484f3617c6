//! Run domain model
//!
//! A run handle identifies the remote workflow run located for a token.
//! It is always rebuilt from a freshly fetched [`WorkflowRun`]; fields are
//! never patched locally.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::token::CorrelationToken;
use crate::dto::run::{RepositoryRef, WorkflowRun};

/// Display name the remote workflow gives a run dispatched with `token`
///
/// The workflow renders it from `client_payload.uuid` as `<prefix>[<uuid>]`.
pub fn run_name(prefix: &str, token: &CorrelationToken) -> String {
    format!("{}[{}]", prefix, token)
}

/// Execution status of a workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Requested,
    Queued,
    Pending,
    Waiting,
    InProgress,
    Completed,
    Other(String),
}

impl RunStatus {
    pub fn from_api(value: &str) -> Self {
        match value {
            "requested" => RunStatus::Requested,
            "queued" => RunStatus::Queued,
            "pending" => RunStatus::Pending,
            "waiting" => RunStatus::Waiting,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            other => RunStatus::Other(other.to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Requested => write!(f, "requested"),
            RunStatus::Queued => write!(f, "queued"),
            RunStatus::Pending => write!(f, "pending"),
            RunStatus::Waiting => write!(f, "waiting"),
            RunStatus::InProgress => write!(f, "in_progress"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Other(other) => write!(f, "{}", other),
        }
    }
}

/// Final outcome of a completed workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    Stale,
    StartupFailure,
    Other(String),
}

impl RunConclusion {
    pub fn from_api(value: &str) -> Self {
        match value {
            "success" => RunConclusion::Success,
            "failure" => RunConclusion::Failure,
            "cancelled" => RunConclusion::Cancelled,
            "skipped" => RunConclusion::Skipped,
            "timed_out" => RunConclusion::TimedOut,
            "action_required" => RunConclusion::ActionRequired,
            "neutral" => RunConclusion::Neutral,
            "stale" => RunConclusion::Stale,
            "startup_failure" => RunConclusion::StartupFailure,
            other => RunConclusion::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunConclusion::Success)
    }
}

impl fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RunConclusion::Success => "success",
            RunConclusion::Failure => "failure",
            RunConclusion::Cancelled => "cancelled",
            RunConclusion::Skipped => "skipped",
            RunConclusion::TimedOut => "timed_out",
            RunConclusion::ActionRequired => "action_required",
            RunConclusion::Neutral => "neutral",
            RunConclusion::Stale => "stale",
            RunConclusion::StartupFailure => "startup_failure",
            RunConclusion::Other(other) => other,
        };
        write!(f, "{}", value)
    }
}

/// The remote run located for a correlation token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub id: u64,
    pub display_name: String,
    pub status: RunStatus,
    /// Only meaningful once `status` is completed; see [`RunHandle::conclusion`]
    conclusion: Option<RunConclusion>,
    pub attempt: u32,
    pub html_url: Option<String>,
    pub repository: Option<RepositoryRef>,
}

impl RunHandle {
    /// Conclusion of the run, `None` until the run is completed
    ///
    /// An in-progress run may still carry a stale conclusion from the API.
    pub fn conclusion(&self) -> Option<&RunConclusion> {
        if self.status.is_completed() {
            self.conclusion.as_ref()
        } else {
            None
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Browser URL of the run
    pub fn web_url(&self) -> String {
        match (&self.repository, &self.html_url) {
            (Some(repo), _) => format!("{}/actions/runs/{}", repo.html_url, self.id),
            (None, Some(url)) => url.clone(),
            (None, None) => format!("run {}", self.id),
        }
    }
}

impl From<WorkflowRun> for RunHandle {
    fn from(run: WorkflowRun) -> Self {
        let display_name = run
            .display_title
            .or(run.name)
            .unwrap_or_default();

        Self {
            id: run.id,
            display_name,
            status: run
                .status
                .as_deref()
                .map(RunStatus::from_api)
                .unwrap_or_else(|| RunStatus::Other("unknown".to_string())),
            conclusion: run.conclusion.as_deref().map(RunConclusion::from_api),
            attempt: run.run_attempt.unwrap_or(1),
            html_url: run.html_url,
            repository: run.repository,
        }
    }
}
