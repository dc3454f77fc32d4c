use async_trait::async_trait;
use tracing::debug;

use sidecron_core::config::{ProjectConfig, ADMIN_ENDPOINT};

use crate::error::AdminError;

/// Refreshes the public projection of a resource after a store mutation.
///
/// Behind a trait so workflow tests can observe the trigger without a
/// network.
#[async_trait]
pub trait PreviewTrigger: Send + Sync {
    async fn refresh(&self, path: &str) -> Result<(), AdminError>;
}

/// Client for the admin API, templated by owner/repo/ref.
///
/// See <https://www.aem.live/docs/admin.html>.
pub struct AdminClient {
    http: reqwest::Client,
    endpoint: String,
    owner: String,
    repo: String,
    git_ref: String,
}

impl AdminClient {
    pub fn new(project: &ProjectConfig) -> Self {
        Self::with_endpoint(project, ADMIN_ENDPOINT)
    }

    pub fn with_endpoint(project: &ProjectConfig, endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            owner: project.owner.clone(),
            repo: project.repo.clone(),
            git_ref: project.git_ref.clone(),
        }
    }

    fn action_url(&self, action: &str, path: &str) -> String {
        format!(
            "{}/{action}/{}/{}/{}{path}",
            self.endpoint, self.owner, self.repo, self.git_ref,
        )
    }

    /// Re-render the preview projection of `path`.
    pub async fn preview(&self, path: &str) -> Result<(), AdminError> {
        self.post("preview", path).await
    }

    /// Publish `path` to live immediately.
    pub async fn publish(&self, path: &str) -> Result<(), AdminError> {
        self.post("live", path).await
    }

    async fn post(&self, action: &str, path: &str) -> Result<(), AdminError> {
        let url = self.action_url(action, path);
        debug!(%url, "admin call");

        let resp = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| AdminError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AdminError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PreviewTrigger for AdminClient {
    async fn refresh(&self, path: &str) -> Result<(), AdminError> {
        self.preview(path).await
    }
}
