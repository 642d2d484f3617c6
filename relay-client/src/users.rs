//! User-related API endpoints

use crate::GitHubClient;
use crate::error::Result;
use relay_core::dto::run::User;

impl GitHubClient {
    /// Get the account the client is authenticated as
    ///
    /// Its login is used as the actor filter when listing dispatched runs.
    pub async fn authenticated_user(&self) -> Result<User> {
        let url = format!("{}/user", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
