// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use wi511_project_editor::application::inventory_service::InventoryService;
use wi511_project_editor::application::layer_feed::FeatureSource;
use wi511_project_editor::application::project_service::ProjectService;
use wi511_project_editor::domain::inventory::{InventoryLayer, catalog};
use wi511_project_editor::domain::winter_roads;
use wi511_project_editor::infrastructure::config::load_settings;
use wi511_project_editor::infrastructure::file_config_store::FileConfigStore;
use wi511_project_editor::infrastructure::inventory_client::InventoryClient;
use wi511_project_editor::infrastructure::winter_roads_client::WinterRoadsClient;
use wi511_project_editor::presentation::app_state::AppState;
use wi511_project_editor::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings().context("loading config/editor.toml")?;

    // Configuration store (infrastructure layer)
    let store = Arc::new(FileConfigStore::new(&settings.store.path));
    let project_service = ProjectService::new(store);

    // Feeds are scoped to the bounds and visibility stored at startup
    let project = project_service
        .load_config()
        .await
        .with_context(|| format!("reading {}", settings.store.path))?;

    let client = reqwest::Client::new();
    let inventory_feeds: Vec<(InventoryLayer, Arc<dyn FeatureSource>)> = catalog()
        .into_iter()
        .map(|resource| {
            let startup_show = project.show_layers.is_shown(resource.visibility_key);
            let layer = InventoryLayer::new(resource, &settings.sources.inventory_url, project.bounds, startup_show);
            let source: Arc<dyn FeatureSource> = Arc::new(InventoryClient::new(layer.clone(), client.clone()));
            (layer, source)
        })
        .collect();

    let winter_roads_feed = if winter_roads::in_season(chrono::Local::now().date_naive()) {
        let source: Arc<dyn FeatureSource> = Arc::new(WinterRoadsClient::new(
            settings.sources.winter_roads_url.clone(),
            project.bounds,
            client.clone(),
        ));
        Some(source)
    } else {
        tracing::info!("winter roads out of season");
        None
    };

    let inventory = Arc::new(InventoryService::new(
        inventory_feeds,
        winter_roads_feed,
        settings.refresh.schedule(),
    ));
    inventory.start();

    let state = Arc::new(AppState {
        project_service,
        inventory: inventory.clone(),
    });
    let router = router(state);

    let addr: SocketAddr = settings
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.server.bind))?;
    tracing::info!(%addr, "starting wi511 project editor service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    inventory.stop();
    Ok(())
}
