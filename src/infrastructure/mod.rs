// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod file_config_store;
pub mod http_config_store;
pub mod http_response;
pub mod inventory_client;
pub mod winter_roads_client;
