//! Relay GitHub Client
//!
//! A small, type-safe HTTP client for the GitHub Actions endpoints the relay
//! pipeline needs: repository dispatch, workflow run listing and fetching,
//! and run log bundles.
//!
//! # Example
//!
//! ```no_run
//! use relay_client::GitHubClient;
//! use relay_core::domain::repository::Repository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::new("https://api.github.com", "ghp_example")?;
//!     let repo: Repository = "octo/actions-test".parse()?;
//!
//!     let run = client.get_workflow_run(&repo, 30433642).await?;
//!     println!("Run {} is {:?}", run.id, run.status);
//!     Ok(())
//! }
//! ```

mod api;
mod dispatch;
pub mod error;
mod logs;
mod runs;
mod users;

// Re-export commonly used types
pub use api::ActionsApi;
pub use error::{ClientError, Result};

use relay_core::domain::repository::Repository;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// How many `301 Moved Permanently` hops are followed when resolving a log
/// bundle location
pub const DEFAULT_MAX_REDIRECTS: u32 = 2;

/// Upper bound on a single request, from connecting until the body is read
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_VERSION: &str = "2022-11-28";

/// HTTP client for the GitHub REST API
///
/// Methods are organized into logical groups:
/// - Users (the authenticated account)
/// - Dispatch (repository_dispatch trigger)
/// - Workflow runs (list, get)
/// - Logs (bundle location, download)
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// Base URL of the API (e.g., "https://api.github.com")
    base_url: String,
    /// Authenticated client for API calls, never follows redirects
    client: Client,
    /// Plain client for downloading log bundles from their signed URL
    download_client: Client,
    /// Redirect budget when resolving log bundle locations
    max_redirects: u32,
}

impl GitHubClient {
    /// Create a new client authenticated with `token`
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "https://api.github.com")
    /// * `token` - Personal access or installation token; empty for anonymous access
    pub fn new(base_url: impl Into<String>, token: &str) -> Result<Self> {
        Self::with_timeout(base_url, token, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new client whose requests give up after `timeout`
    ///
    /// The bound applies to API calls and log downloads alike.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .default_headers(default_headers(token)?)
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        let download_client = Client::builder().timeout(timeout).build()?;

        Ok(Self::from_parts(base_url.into(), client, download_client))
    }

    /// Create a new client with a custom HTTP client for API calls
    ///
    /// The client should carry the authentication headers, a request timeout
    /// and must not follow redirects, otherwise log bundle locations cannot
    /// be resolved.
    ///
    /// # Example
    /// ```no_run
    /// use relay_client::GitHubClient;
    /// use reqwest::redirect::Policy;
    /// use std::time::Duration;
    ///
    /// let http_client = reqwest::Client::builder()
    ///     .redirect(Policy::none())
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    /// let client = GitHubClient::with_client("https://api.github.com", http_client).unwrap();
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Result<Self> {
        let download_client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::from_parts(base_url.into(), client, download_client))
    }

    fn from_parts(base_url: String, client: Client, download_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            download_client,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Set how many permanent redirects are followed when resolving log locations
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn repo_url(&self, repo: &Repository, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, repo.owner, repo.name, path
        )
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., dispatch)
    ///
    /// This method checks the status code and returns an error if the request failed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("relay/", env!("CARGO_PKG_VERSION"))),
    );

    if !token.is_empty() {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ClientError::InvalidRequest("token contains characters not allowed in a header".into())
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
    }

    Ok(headers)
}
