//! Actions API trait
//!
//! The pipeline depends on this trait rather than on [`GitHubClient`]
//! directly so stages can be exercised against scripted responses.

use async_trait::async_trait;
use relay_core::domain::repository::Repository;
use relay_core::dto::dispatch::DispatchRequest;
use relay_core::dto::run::{RunFilter, User, WorkflowRun};

use crate::GitHubClient;
use crate::error::Result;

/// Remote operations used by the dispatch pipeline
#[async_trait]
pub trait ActionsApi: Send + Sync {
    /// Account the client is authenticated as
    async fn authenticated_user(&self) -> Result<User>;

    /// Trigger a `repository_dispatch` event
    async fn dispatch(&self, repo: &Repository, request: &DispatchRequest) -> Result<()>;

    /// List runs of a workflow, in API order
    async fn list_workflow_runs(
        &self,
        repo: &Repository,
        workflow: &str,
        filter: &RunFilter,
    ) -> Result<Vec<WorkflowRun>>;

    /// Fetch one run with its current state
    async fn get_workflow_run(&self, repo: &Repository, run_id: u64) -> Result<WorkflowRun>;

    /// Resolve the download URL of a run attempt's log bundle
    async fn run_attempt_logs_url(
        &self,
        repo: &Repository,
        run_id: u64,
        attempt: u32,
    ) -> Result<String>;

    /// Download a log bundle
    async fn download_logs(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl ActionsApi for GitHubClient {
    async fn authenticated_user(&self) -> Result<User> {
        GitHubClient::authenticated_user(self).await
    }

    async fn dispatch(&self, repo: &Repository, request: &DispatchRequest) -> Result<()> {
        GitHubClient::dispatch(self, repo, request).await
    }

    async fn list_workflow_runs(
        &self,
        repo: &Repository,
        workflow: &str,
        filter: &RunFilter,
    ) -> Result<Vec<WorkflowRun>> {
        GitHubClient::list_workflow_runs(self, repo, workflow, filter).await
    }

    async fn get_workflow_run(&self, repo: &Repository, run_id: u64) -> Result<WorkflowRun> {
        GitHubClient::get_workflow_run(self, repo, run_id).await
    }

    async fn run_attempt_logs_url(
        &self,
        repo: &Repository,
        run_id: u64,
        attempt: u32,
    ) -> Result<String> {
        GitHubClient::run_attempt_logs_url(self, repo, run_id, attempt).await
    }

    async fn download_logs(&self, url: &str) -> Result<Vec<u8>> {
        GitHubClient::download_logs(self, url).await
    }
}
