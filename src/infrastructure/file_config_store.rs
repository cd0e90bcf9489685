// File-backed project configuration store
use crate::application::config_repository::ConfigRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// JSON with a four-space indent, the layout operators edit by hand.
pub fn to_pretty_json(document: &Value) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}

#[async_trait]
impl ConfigRepository for FileConfigStore {
    async fn load_raw(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))
    }

    async fn save(&self, document: Value) -> Result<Value> {
        let text = to_pretty_json(&document)?;
        tokio::fs::write(&self.path, text)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "configuration written");
        Ok(document)
    }
}
