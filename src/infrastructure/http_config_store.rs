// Configuration store reached over HTTP
use crate::application::config_repository::ConfigRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct HttpConfigStore {
    url: String,
    client: reqwest::Client,
}

impl HttpConfigStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ConfigRepository for HttpConfigStore {
    async fn load_raw(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to reach configuration store")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Configuration store returned {}: {}", status, body);
        }

        response.text().await.context("Failed to read configuration document")
    }

    async fn save(&self, document: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "newConfig": document }))
            .send()
            .await
            .context("Failed to reach configuration store")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Configuration store rejected save with {}: {}", status, body);
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse configuration store reply")
    }
}
