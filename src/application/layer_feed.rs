// Layer feed - one periodically refreshed remote layer
use crate::domain::inventory::RenderedFeature;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Fetch and render the full current feature set
    async fn fetch(&self) -> anyhow::Result<Vec<RenderedFeature>>;
}

/// Features of one refresh together with when they were fetched.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub features: Arc<Vec<RenderedFeature>>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Latest successfully fetched features of one layer. Every refresh replaces
/// the whole set; a failed refresh leaves the previous set in place.
pub struct LayerFeed {
    pub id: String,
    pub name: String,
    source: Arc<dyn FeatureSource>,
    current: RwLock<FeedSnapshot>,
}

impl LayerFeed {
    pub fn new(id: impl Into<String>, name: impl Into<String>, source: Arc<dyn FeatureSource>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source,
            current: RwLock::new(FeedSnapshot::default()),
        }
    }

    /// Fetch now and swap in the result. Returns the new feature count.
    pub async fn refresh_now(&self) -> anyhow::Result<usize> {
        match self.source.fetch().await {
            Ok(features) => {
                let count = features.len();
                *self.current.write().await = FeedSnapshot {
                    features: Arc::new(features),
                    refreshed_at: Some(Utc::now()),
                };
                tracing::debug!(feed = %self.id, count, "feed refreshed");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(feed = %self.id, error = %e, "feed refresh failed, keeping previous features");
                Err(e)
            }
        }
    }

    /// Features and refresh time, read together.
    pub async fn snapshot(&self) -> FeedSnapshot {
        self.current.read().await.clone()
    }

    pub async fn features(&self) -> Arc<Vec<RenderedFeature>> {
        self.current.read().await.features.clone()
    }

    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.current.read().await.refreshed_at
    }
}
