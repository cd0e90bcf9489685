// 511 inventory API client
use crate::application::layer_feed::FeatureSource;
use crate::domain::inventory::{InventoryLayer, RemoteFeatureCollection, RenderedFeature};
use anyhow::{Context, Result};
use async_trait::async_trait;

pub struct InventoryClient {
    layer: InventoryLayer,
    client: reqwest::Client,
}

impl InventoryClient {
    pub fn new(layer: InventoryLayer, client: reqwest::Client) -> Self {
        Self { layer, client }
    }
}

#[async_trait]
impl FeatureSource for InventoryClient {
    async fn fetch(&self) -> Result<Vec<RenderedFeature>> {
        let response = self
            .client
            .get(&self.layer.source_url)
            .query(&self.layer.query_params())
            .send()
            .await
            .with_context(|| format!("Failed to request {}", self.layer.resource.resource))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Inventory request for {} failed with status {}",
                self.layer.resource.resource,
                response.status()
            );
        }

        let collection = response
            .json::<RemoteFeatureCollection>()
            .await
            .with_context(|| format!("Failed to parse {} features", self.layer.resource.resource))?;

        Ok(collection.features.into_iter().map(|f| self.layer.render(f)).collect())
    }
}
