// Project service - loads and saves the project configuration
use crate::application::config_repository::ConfigRepository;
use crate::application::editor_session::EditorSession;
use crate::application::inventory_service::InventoryService;
use crate::application::legend::legend_document;
use crate::domain::feature_layer::ExportError;
use crate::domain::project_config::ProjectConfig;
use anyhow::Context;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct ProjectService {
    repository: Arc<dyn ConfigRepository>,
}

impl ProjectService {
    pub fn new(repository: Arc<dyn ConfigRepository>) -> Self {
        Self { repository }
    }

    pub async fn raw_document(&self) -> anyhow::Result<String> {
        self.repository.load_raw().await
    }

    /// Replace the stored document without interpreting it.
    pub async fn overwrite(&self, document: Value) -> anyhow::Result<Value> {
        self.repository.save(document).await
    }

    pub async fn load_config(&self) -> anyhow::Result<ProjectConfig> {
        let document = self.repository.load().await.context("loading project configuration")?;
        ProjectConfig::from_value(document).context("project configuration has an unexpected shape")
    }

    pub async fn open_session(&self) -> anyhow::Result<EditorSession> {
        Ok(EditorSession::from_config(self.load_config().await?))
    }

    /// Export the session and overwrite the store. Nothing is written when
    /// the export fails.
    pub async fn save(&self, session: &EditorSession) -> Result<Value, SaveError> {
        let config = session.export()?;
        let document = config.to_value().map_err(|e| ExportError::Serialize(e.to_string()))?;
        let saved = self.repository.save(document).await?;
        tracing::info!(layers = config.layers.len(), "project configuration saved");
        Ok(saved)
    }

    pub async fn editor_markup(&self) -> anyhow::Result<String> {
        Ok(self.open_session().await?.editor_markup())
    }

    pub async fn legend_markup(&self, inventory: &InventoryService) -> anyhow::Result<String> {
        let session = self.open_session().await?;
        Ok(legend_document(
            inventory.layers(),
            session.show_layers(),
            inventory.winter_roads_active(),
            &session,
        ))
    }
}
