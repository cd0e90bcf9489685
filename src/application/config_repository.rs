// Repository trait for the project configuration store
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// The stored document exactly as persisted
    async fn load_raw(&self) -> anyhow::Result<String>;

    /// Replace the stored document wholesale and return what was stored
    async fn save(&self, document: Value) -> anyhow::Result<Value>;

    /// The stored document parsed as JSON
    async fn load(&self) -> anyhow::Result<Value> {
        let raw = self.load_raw().await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
