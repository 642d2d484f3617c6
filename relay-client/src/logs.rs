//! Workflow run log endpoints

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use tracing::debug;

use crate::GitHubClient;
use crate::error::{ClientError, Result};
use relay_core::domain::repository::Repository;

impl GitHubClient {
    /// Resolve the download location of a run attempt's log bundle
    ///
    /// The API answers with a `302 Found` pointing at a short-lived signed
    /// URL. `301 Moved Permanently` answers (renamed or transferred
    /// repositories) are followed up to the configured redirect budget. Any
    /// other answer, including a 301 past that budget, is an API error.
    ///
    /// # Arguments
    /// * `repo` - Repository owning the run
    /// * `run_id` - The run ID
    /// * `attempt` - The run attempt number, starting at 1
    ///
    /// # Returns
    /// The URL of the zip archive
    pub async fn run_attempt_logs_url(
        &self,
        repo: &Repository,
        run_id: u64,
        attempt: u32,
    ) -> Result<String> {
        let mut url = self.repo_url(
            repo,
            &format!("actions/runs/{}/attempts/{}/logs", run_id, attempt),
        );
        let mut hops = 0;

        loop {
            let response = self.client.get(&url).send().await?;
            let status = response.status();

            if status == StatusCode::MOVED_PERMANENTLY && hops < self.max_redirects {
                hops += 1;
                url = redirect_target(&response)?;
                debug!(hops, %url, "Following permanent redirect for log bundle");
                continue;
            }

            if status == StatusCode::FOUND {
                return redirect_target(&response);
            }

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }
    }

    /// Download a log bundle from its signed URL
    ///
    /// The URL carries its own credentials, so no API headers are sent.
    pub async fn download_logs(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.download_client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Absolute URL from a redirect's `Location` header
fn redirect_target(response: &reqwest::Response) -> Result<String> {
    let location = response
        .headers()
        .get(LOCATION)
        .ok_or_else(|| ClientError::ParseError("redirect without Location header".into()))?
        .to_str()
        .map_err(|_| ClientError::ParseError("Location header is not valid text".into()))?;

    response
        .url()
        .join(location)
        .map(|url| url.to_string())
        .map_err(|e| ClientError::ParseError(format!("invalid Location '{}': {}", location, e)))
}

#[cfg(test)]
mod tests {
    use crate::{ClientError, GitHubClient};
    use httpmock::prelude::*;
    use relay_core::domain::repository::Repository;
    use serde_json::json;

    const LOGS_PATH: &str = "/repos/octo/repo/actions/runs/42/attempts/1/logs";
    const RENAMED_PATH: &str = "/repos/octo/renamed/actions/runs/42/attempts/1/logs";

    #[tokio::test]
    async fn test_logs_url_from_found_redirect() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(LOGS_PATH)
                .header("authorization", "Bearer secret");
            then.status(302)
                .header("location", "https://blobs.example.com/logs.zip?sig=abc");
        });

        let client = GitHubClient::new(server.base_url(), "secret").unwrap();
        let url = client
            .run_attempt_logs_url(&Repository::new("octo", "repo"), 42, 1)
            .await
            .unwrap();

        assert_eq!(url, "https://blobs.example.com/logs.zip?sig=abc");
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn test_logs_url_follows_permanent_redirect() {
        let server = MockServer::start();
        let moved = server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(301).header("location", RENAMED_PATH);
        });
        let found = server.mock(|when, then| {
            when.method(GET).path(RENAMED_PATH);
            then.status(302)
                .header("location", "https://blobs.example.com/logs.zip");
        });

        let client = GitHubClient::new(server.base_url(), "secret").unwrap();
        let url = client
            .run_attempt_logs_url(&Repository::new("octo", "repo"), 42, 1)
            .await
            .unwrap();

        assert_eq!(url, "https://blobs.example.com/logs.zip");
        moved.assert_calls(1);
        found.assert_calls(1);
    }

    #[tokio::test]
    async fn test_logs_url_redirect_budget_exhausted() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(301).header("location", RENAMED_PATH);
        });
        let second = server.mock(|when, then| {
            when.method(GET).path(RENAMED_PATH);
            then.status(301)
                .header("location", "/repos/octo/renamed-again/actions/runs/42/attempts/1/logs");
        });

        let client = GitHubClient::new(server.base_url(), "secret")
            .unwrap()
            .with_max_redirects(1);
        let err = client
            .run_attempt_logs_url(&Repository::new("octo", "repo"), 42, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::ApiError { status: 301, .. }));
        first.assert_calls(1);
        second.assert_calls(1);
    }

    #[tokio::test]
    async fn test_logs_url_rejects_other_redirects() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LOGS_PATH);
            then.status(307)
                .header("location", "https://blobs.example.com/logs.zip");
        });

        let client = GitHubClient::new(server.base_url(), "secret").unwrap();
        let err = client
            .run_attempt_logs_url(&Repository::new("octo", "repo"), 42, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::ApiError { status: 307, .. }));
    }

    #[tokio::test]
    async fn test_logs_url_missing_logs() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/repo/actions/runs/42/attempts/3/logs");
            then.status(410).json_body(json!({"message": "Server Error"}));
        });

        let client = GitHubClient::new(server.base_url(), "secret").unwrap();
        let err = client
            .run_attempt_logs_url(&Repository::new("octo", "repo"), 42, 3)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::ApiError { status: 410, .. }));
    }

    #[tokio::test]
    async fn test_download_logs_without_api_credentials() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/logs.zip")
                .header_missing("authorization");
            then.status(200).body("PK-bytes");
        });

        let client = GitHubClient::new("https://api.github.com", "secret").unwrap();
        let bytes = client
            .download_logs(&server.url("/logs.zip"))
            .await
            .unwrap();

        assert_eq!(bytes, b"PK-bytes");
        mock.assert_calls(1);
    }
}
