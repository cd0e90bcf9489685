// Application state for HTTP handlers
use crate::application::inventory_service::InventoryService;
use crate::application::project_service::ProjectService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub project_service: ProjectService,
    pub inventory: Arc<InventoryService>,
}
