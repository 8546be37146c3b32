use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::tag::Tag;

/// Client for the quay.io repository tag API.
///
/// The token is held for the lifetime of the client and sent as a bearer
/// token with every request.
pub struct QuayClient {
    client: Client,
    registry: String,
    token: String,
}

impl std::fmt::Debug for QuayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuayClient")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl QuayClient {
    pub fn new(registry: &str, token: String) -> Self {
        Self {
            client: Client::new(),
            registry: registry.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn tag_endpoint(&self, repository: &str) -> String {
        format!("{}/api/v1/repository/{repository}/tag/", self.registry)
    }

    #[instrument]
    pub async fn list_active_tags(&self, repository: &str) -> Result<Vec<Tag>> {
        #[derive(Debug, Deserialize)]
        struct Response {
            tags: Vec<Tag>,
        }

        let url = format!("{}?onlyActiveTags=true", self.tag_endpoint(repository));
        let response: Response = self.client.get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Failed to fetch tags from {url}"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("Failed to parse tags from {url}"))?;

        debug!("Found {} active tags", response.tags.len());
        Ok(response.tags)
    }

    #[instrument]
    pub async fn delete_tag(&self, repository: &str, tag: &str) -> Result<()> {
        let url = format!("{}{tag}", self.tag_endpoint(repository));
        self.client.delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Failed to delete {url}"))?
            .error_for_status()?;
        Ok(())
    }
}
