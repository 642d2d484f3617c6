//! Workflow run endpoints

use crate::GitHubClient;
use crate::error::Result;
use relay_core::domain::repository::Repository;
use relay_core::dto::run::{RunFilter, WorkflowRun, WorkflowRunList};

impl GitHubClient {
    /// List the runs of one workflow file, newest first
    ///
    /// # Arguments
    /// * `repo` - Repository owning the workflow
    /// * `workflow` - Workflow file name (e.g., "dispatch.yml") or numeric ID
    /// * `filter` - Actor and trigger event filters
    ///
    /// # Returns
    /// The runs in the order the API listed them
    pub async fn list_workflow_runs(
        &self,
        repo: &Repository,
        workflow: &str,
        filter: &RunFilter,
    ) -> Result<Vec<WorkflowRun>> {
        let url = self.repo_url(repo, &format!("actions/workflows/{}/runs", workflow));
        let response = self.client.get(&url).query(filter).send().await?;

        let list: WorkflowRunList = self.handle_response(response).await?;
        Ok(list.workflow_runs)
    }

    /// Get a workflow run by ID
    ///
    /// # Arguments
    /// * `repo` - Repository owning the run
    /// * `run_id` - The run ID
    ///
    /// # Returns
    /// The run with its current status, conclusion and attempt number
    pub async fn get_workflow_run(&self, repo: &Repository, run_id: u64) -> Result<WorkflowRun> {
        let url = self.repo_url(repo, &format!("actions/runs/{}", run_id));
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
