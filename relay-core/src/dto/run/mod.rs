//! Workflow run DTOs
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! API responses is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// A workflow run as returned by the listing and fetch endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    /// Workflow name, or the run name on older API versions
    pub name: Option<String>,
    /// Run name as rendered from the workflow's `run-name`
    pub display_title: Option<String>,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub run_attempt: Option<u32>,
    pub html_url: Option<String>,
    pub repository: Option<RepositoryRef>,
}

impl WorkflowRun {
    /// Checks whether either of the run's names is exactly `run_name`
    pub fn is_named(&self, run_name: &str) -> bool {
        self.display_title.as_deref() == Some(run_name) || self.name.as_deref() == Some(run_name)
    }
}

/// Response of `GET .../actions/workflows/{workflow}/runs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRunList {
    pub total_count: u64,
    pub workflow_runs: Vec<WorkflowRun>,
}

/// Repository summary embedded in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub full_name: String,
    pub html_url: String,
}

/// Authenticated user (`GET /user`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// Query filters for listing workflow runs
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}
