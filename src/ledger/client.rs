//! Fullnode REST client.

use crate::config::LedgerConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Read access to a ledger node.
#[async_trait]
pub trait LedgerNode: Send + Sync {
    /// `GET /transactions/by_hash/<hash>`, returning the JSON body.
    ///
    /// Non-2xx responses are errors.
    async fn transaction_by_hash(&self, hash: &str) -> Result<Value>;
}

/// Builder for creating a node client.
pub struct NodeClientBuilder {
    base_url: String,
    timeout: Duration,
}

impl NodeClientBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        let defaults = LedgerConfig::default();
        Self {
            timeout: defaults.request_timeout(),
            base_url: defaults.node_url,
        }
    }

    /// Take base URL and timeout from the ledger configuration.
    pub fn config(mut self, config: &LedgerConfig) -> Self {
        self.base_url = config.node_url.clone();
        self.timeout = config.request_timeout();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the node client.
    pub fn build(self) -> Result<NodeClient> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config("Ledger node URL not configured"));
        }

        let http_client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(NodeClient {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

impl Default for NodeClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for a fullnode's REST API.
#[derive(Debug, Clone)]
pub struct NodeClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl NodeClient {
    pub fn builder() -> NodeClientBuilder {
        NodeClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transaction_url(&self, hash: &str) -> String {
        format!("{}/transactions/by_hash/{}", self.base_url, hash)
    }
}

#[async_trait]
impl LedgerNode for NodeClient {
    async fn transaction_by_hash(&self, hash: &str) -> Result<Value> {
        let response = self
            .http_client
            .get(self.transaction_url(hash))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!(
                "Node returned {} for transaction {}",
                status, hash
            )));
        }

        Ok(response.json().await?)
    }
}
