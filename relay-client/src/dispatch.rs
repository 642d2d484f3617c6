//! Repository dispatch endpoint

use crate::GitHubClient;
use crate::error::Result;
use relay_core::domain::repository::Repository;
use relay_core::dto::dispatch::DispatchRequest;

impl GitHubClient {
    /// Trigger a `repository_dispatch` event
    ///
    /// The API answers `204 No Content` and does not say which run, if any,
    /// the event started. Callers correlate through the payload instead.
    ///
    /// # Arguments
    /// * `repo` - Repository receiving the event
    /// * `request` - Event type and client payload
    ///
    /// # Example
    /// ```no_run
    /// # use relay_client::GitHubClient;
    /// # use relay_core::domain::command::CommandBatch;
    /// # use relay_core::domain::repository::Repository;
    /// # use relay_core::domain::token::CorrelationToken;
    /// # use relay_core::dto::dispatch::DispatchRequest;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = GitHubClient::new("https://api.github.com", "ghp_example")?;
    /// let request = DispatchRequest::new(
    ///     "test",
    ///     CorrelationToken::generate(),
    ///     CommandBatch::from_text("echo hi\n"),
    /// );
    /// client.dispatch(&Repository::new("octo", "actions-test"), &request).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn dispatch(&self, repo: &Repository, request: &DispatchRequest) -> Result<()> {
        let url = self.repo_url(repo, "dispatches");
        let response = self.client.post(&url).json(request).send().await?;

        self.handle_empty_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{ClientError, GitHubClient};
    use httpmock::prelude::*;
    use relay_core::domain::command::CommandBatch;
    use relay_core::domain::repository::Repository;
    use relay_core::domain::token::CorrelationToken;
    use relay_core::dto::dispatch::DispatchRequest;
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_posts_payload() {
        let token = CorrelationToken::generate();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/octo/actions-test/dispatches")
                .header("authorization", "Bearer secret")
                .json_body(json!({
                    "event_type": "test",
                    "client_payload": {
                        "uuid": token.to_string(),
                        "commands": ["echo hi"]
                    }
                }));
            then.status(204);
        });

        let client = GitHubClient::new(server.base_url(), "secret").unwrap();
        let request = DispatchRequest::new("test", token, CommandBatch::from_text("echo hi"));
        client
            .dispatch(&Repository::new("octo", "actions-test"), &request)
            .await
            .unwrap();

        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn test_dispatch_failure_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/repos/octo/missing/dispatches");
            then.status(404).json_body(json!({"message": "Not Found"}));
        });

        let client = GitHubClient::new(server.base_url(), "secret").unwrap();
        let request = DispatchRequest::new(
            "test",
            CorrelationToken::generate(),
            CommandBatch::default(),
        );

        let err = client
            .dispatch(&Repository::new("octo", "missing"), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 404, .. }));
    }
}
