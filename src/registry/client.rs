//! Registry API Client
//!
//! HTTP implementation of the publish interface. Publishing is an
//! overwrite-style PUT keyed by identifier, so re-publishing an unchanged
//! document overwrites with identical content and a re-run of the whole
//! pipeline stays idempotent.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::types::{Metadata, RegistryClient};

/// Registry API client.
pub struct RegistryHttpClient {
    pub api_url: String,
    api_key: String,
    http: Client,
}

impl RegistryHttpClient {
    /// Create a new registry client.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            api_url,
            api_key,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl RegistryClient for RegistryHttpClient {
    /// Publish one document as `PUT /v1/skills/{identifier}`.
    ///
    /// Any non-success response surfaces the status and response text
    /// verbatim so the batch report carries the upstream reason.
    async fn publish(&self, identifier: &str, metadata: &Metadata, body: &str) -> Result<()> {
        let encoded = urlencoding::encode(identifier);
        let url = format!("{}/v1/skills/{}", self.api_url, encoded);

        debug!("Publishing '{}' to {}", identifier, url);

        let payload = json!({
            "metadata": metadata,
            "body": body,
        });

        let resp = self
            .http
            .put(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", &self.api_key)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Registry request failed for '{}'", identifier))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "Registry error: PUT {} -> {}: {}",
                url,
                status.as_u16(),
                text
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_path_encoded() {
        let encoded = urlencoding::encode("odd skill/name");
        assert_eq!(encoded, "odd%20skill%2Fname");
    }

    #[test]
    fn test_client_construction() {
        let client = RegistryHttpClient::new(
            "https://registry.example".to_string(),
            "key".to_string(),
        );
        assert_eq!(client.api_url, "https://registry.example");
    }
}
