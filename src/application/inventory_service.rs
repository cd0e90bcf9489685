// Inventory service - owns the traveler information feeds and their schedules
use crate::application::layer_feed::{FeatureSource, LayerFeed};
use crate::application::refresh_task::{RefreshSchedule, RefreshTask};
use crate::domain::inventory::InventoryLayer;
use crate::domain::winter_roads;
use futures::future::join_all;
use std::sync::{Arc, Mutex};

pub struct InventoryService {
    layers: Vec<InventoryLayer>,
    feeds: Vec<Arc<LayerFeed>>,
    winter_roads_active: bool,
    schedule: RefreshSchedule,
    tasks: Mutex<Vec<RefreshTask>>,
}

impl InventoryService {
    /// `winter_roads` is only given while the winter roads season is on.
    pub fn new(
        inventory: Vec<(InventoryLayer, Arc<dyn FeatureSource>)>,
        winter_roads: Option<Arc<dyn FeatureSource>>,
        schedule: RefreshSchedule,
    ) -> Self {
        let mut layers = Vec::with_capacity(inventory.len());
        let mut feeds = Vec::with_capacity(inventory.len() + 1);
        for (layer, source) in inventory {
            feeds.push(Arc::new(LayerFeed::new(layer.id.clone(), layer.name.clone(), source)));
            layers.push(layer);
        }

        let winter_roads_active = winter_roads.is_some();
        if let Some(source) = winter_roads {
            feeds.push(Arc::new(LayerFeed::new(winter_roads::LAYER_ID, "Winter Roads", source)));
        }

        Self {
            layers,
            feeds,
            winter_roads_active,
            schedule,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn layers(&self) -> &[InventoryLayer] {
        &self.layers
    }

    pub fn winter_roads_active(&self) -> bool {
        self.winter_roads_active
    }

    pub fn feed(&self, id: &str) -> Option<Arc<LayerFeed>> {
        self.feeds.iter().find(|f| f.id == id).cloned()
    }

    pub fn feed_ids(&self) -> Vec<String> {
        self.feeds.iter().map(|f| f.id.clone()).collect()
    }

    /// Start one refresh task per feed. Calling again restarts them.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.clear();
        for feed in &self.feeds {
            tasks.push(RefreshTask::start(feed.clone(), self.schedule));
        }
        tracing::info!(feeds = tasks.len(), "inventory refresh started");
    }

    pub fn stop(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for task in tasks.drain(..) {
            task.stop();
        }
    }

    /// Refresh every feed once, concurrently. Returns how many succeeded.
    pub async fn refresh_all(&self) -> usize {
        let results = join_all(self.feeds.iter().map(|feed| feed.refresh_now())).await;
        results.iter().filter(|r| r.is_ok()).count()
    }
}
