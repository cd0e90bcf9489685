// HTTP request handlers
use crate::domain::inventory::RenderedFeature;
use crate::domain::winter_roads;
use crate::infrastructure::http_response::{accepts_brotli, html_response, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedBody<'a> {
    layer_id: &'a str,
    layer_name: &'a str,
    last_refreshed: Option<String>,
    features: &'a [RenderedFeature],
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Stored configuration document, verbatim
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.project_service.raw_document().await {
        Ok(raw) => ([(header::CONTENT_TYPE, "application/json")], raw).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "failed to read configuration");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Overwrite the stored document with `newConfig` and echo it back
pub async fn post_config(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let mut request: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "configuration update is not JSON");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let document = request
        .get_mut("newConfig")
        .map(Value::take)
        .unwrap_or(Value::Null);
    if document.is_null() {
        tracing::warn!("configuration update without newConfig, storing null");
    }

    match state.project_service.overwrite(document).await {
        Ok(saved) => ([(header::CONTENT_TYPE, "application/json")], saved.to_string()).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "failed to write configuration");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Any other method on `/config`
pub async fn config_fallback() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{}")
}

/// Viewer legend for the stored project
pub async fn legend(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.project_service.legend_markup(&state.inventory).await {
        Ok(markup) => html_response(markup).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "failed to build legend");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Editor accordion for the stored project
pub async fn editor(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.project_service.editor_markup().await {
        Ok(markup) => html_response(markup).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "failed to build editor markup");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn feed_response(state: &AppState, layer_id: &str, headers: &HeaderMap) -> axum::response::Response {
    let Some(feed) = state.inventory.feed(layer_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let snapshot = feed.snapshot().await;
    let body = FeedBody {
        layer_id: &feed.id,
        layer_name: &feed.name,
        last_refreshed: snapshot.refreshed_at.map(|t| t.to_rfc3339()),
        features: &snapshot.features,
    };

    match json_response(&body, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Current features of one inventory feed
pub async fn inventory_features(
    Path(layer_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    feed_response(&state, &layer_id, &headers).await
}

/// Current winter road segments; 404 out of season
pub async fn winter_roads_features(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    feed_response(&state, winter_roads::LAYER_ID, &headers).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::inventory_service::InventoryService;
    use crate::application::layer_feed::FeatureSource;
    use crate::application::layer_feed::tests::{ScriptedSource, features};
    use crate::application::project_service::ProjectService;
    use crate::application::refresh_task::RefreshSchedule;
    use crate::domain::bounds::Bounds;
    use crate::domain::fixtures::SAMPLE;
    use crate::domain::inventory::{InventoryLayer, catalog};
    use crate::infrastructure::file_config_store::FileConfigStore;
    use axum::body::to_bytes;
    use axum::http::HeaderValue;
    use axum::response::Response;
    use tempfile::TempDir;

    fn state(document: &str) -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projectConfig.json");
        std::fs::write(&path, document).unwrap();

        let bounds = Bounds { south: 43.0, west: -89.5, north: 43.2, east: -89.3 };
        let cameras = InventoryLayer::new(catalog().remove(3), "http://example.test", bounds, false);
        let source: Arc<dyn FeatureSource> = Arc::new(ScriptedSource::new(vec![Ok(features(4))]));
        let inventory = InventoryService::new(vec![(cameras, source)], None, RefreshSchedule::default());

        let state = Arc::new(AppState {
            project_service: ProjectService::new(Arc::new(FileConfigStore::new(path))),
            inventory: Arc::new(inventory),
        });
        (dir, state)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_post_then_get_returns_pretty_document() {
        let (_dir, state) = state("{}");

        let posted = post_config(State(state.clone()), Bytes::from(r#"{"newConfig":{"a":1}}"#))
            .await
            .into_response();
        assert_eq!(posted.status(), StatusCode::OK);
        assert_eq!(body_text(posted).await, r#"{"a":1}"#);

        let fetched = get_config(State(state)).await.into_response();
        assert_eq!(fetched.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_text(fetched).await, "{\n    \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_post_keeps_key_order() {
        let (_dir, state) = state("{}");

        let posted = post_config(
            State(state.clone()),
            Bytes::from(r#"{"newConfig":{"zoom":1,"bounds":{"west":2,"east":3},"layers":[]}}"#),
        )
        .await
        .into_response();
        assert_eq!(body_text(posted).await, r#"{"zoom":1,"bounds":{"west":2,"east":3},"layers":[]}"#);

        let fetched = body_text(get_config(State(state)).await.into_response()).await;
        assert_eq!(
            fetched,
            "{\n    \"zoom\": 1,\n    \"bounds\": {\n        \"west\": 2,\n        \"east\": 3\n    },\n    \"layers\": []\n}"
        );
    }

    #[tokio::test]
    async fn test_post_without_new_config_stores_null() {
        let (_dir, state) = state(SAMPLE);

        let posted = post_config(State(state.clone()), Bytes::from(r#"{"config":{}}"#))
            .await
            .into_response();
        assert_eq!(body_text(posted).await, "null");
        assert_eq!(body_text(get_config(State(state)).await.into_response()).await, "null");
    }

    #[tokio::test]
    async fn test_malformed_post_writes_nothing() {
        let (_dir, state) = state(SAMPLE);

        let posted = post_config(State(state.clone()), Bytes::from("newConfig=1")).await.into_response();
        assert_eq!(posted.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(get_config(State(state)).await.into_response()).await, SAMPLE);
    }

    #[tokio::test]
    async fn test_fallback_is_empty_object() {
        assert_eq!(body_text(config_fallback().await.into_response()).await, "{}");
    }

    #[tokio::test]
    async fn test_legend_and_editor_markup() {
        let (_dir, state) = state(SAMPLE);

        let legend = legend(State(state.clone())).await.into_response();
        assert_eq!(legend.status(), StatusCode::OK);
        let legend = body_text(legend).await;
        assert!(legend.contains("<input id=\"Cameras\""));
        assert!(legend.contains("Detours"));

        let editor = body_text(editor(State(state)).await.into_response()).await;
        assert!(editor.contains("Work Zones"));
    }

    #[tokio::test]
    async fn test_broken_document_is_server_error() {
        let (_dir, state) = state("not json");
        assert_eq!(
            legend(State(state.clone())).await.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(get_config(State(state)).await.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_inventory_features() {
        let (_dir, state) = state(SAMPLE);
        state.inventory.refresh_all().await;

        let response = inventory_features(Path("Cameras".to_string()), HeaderMap::new(), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(snapshot["layerId"], "Cameras");
        assert_eq!(snapshot["features"].as_array().unwrap().len(), 4);
        assert!(snapshot["lastRefreshed"].is_string());

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, br"));
        let compressed = inventory_features(Path("Cameras".to_string()), headers, State(state.clone()))
            .await
            .into_response();
        assert_eq!(compressed.headers()[header::CONTENT_ENCODING], "br");

        let missing = inventory_features(Path("Nope".to_string()), HeaderMap::new(), State(state.clone()))
            .await
            .into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let out_of_season = winter_roads_features(HeaderMap::new(), State(state)).await.into_response();
        assert_eq!(out_of_season.status(), StatusCode::NOT_FOUND);
    }
}
