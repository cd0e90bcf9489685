// Application layer - editor use cases and feed scheduling
pub mod config_repository;
pub mod editor_session;
pub mod inventory_service;
pub mod layer_feed;
pub mod legend;
pub mod project_service;
pub mod refresh_task;
