use crate::application::refresh_task::RefreshSchedule;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub sources: SourceSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StoreSettings {
    /// Project configuration document served at `/config`
    pub path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: "config/projectConfig.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SourceSettings {
    pub inventory_url: String,
    pub winter_roads_url: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            inventory_url: "http://www.topslab.wisc.edu/its/inventory/api".to_string(),
            winter_roads_url: "http://transportal.cee.wisc.edu/applications/arcgis2/rest/services/WRS/WRS_CurrentConditions/MapServer/0/query"
                .to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    pub initial_jitter_ms: u64,
    pub interval_jitter_ms: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            initial_jitter_ms: 2_000,
            interval_jitter_ms: 10_000,
        }
    }
}

impl RefreshSettings {
    pub fn schedule(&self) -> RefreshSchedule {
        RefreshSchedule {
            initial_jitter: Duration::from_millis(self.initial_jitter_ms),
            interval: Duration::from_secs(self.interval_secs),
            interval_jitter: Duration::from_millis(self.interval_jitter_ms),
        }
    }
}

/// `config/editor.toml` (optional) overlaid with `WI511_SECTION__KEY`
/// environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from("config/editor")
}

pub fn load_settings_from(path: &str) -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("WI511")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
