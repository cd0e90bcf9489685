// Presentation layer - HTTP routes
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    config_fallback, editor, get_config, health_check, inventory_features, legend, post_config,
    winter_roads_features,
};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Compression is applied per response in http_response, so no CompressionLayer here.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route(
            "/config",
            get(get_config).post(post_config).fallback(config_fallback),
        )
        .route("/legend", get(legend))
        .route("/editor", get(editor))
        .route("/inventory/:layer_id", get(inventory_features))
        .route("/winter-roads", get(winter_roads_features))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
