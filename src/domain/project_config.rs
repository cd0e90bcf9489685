// Persisted project configuration document
use super::bounds::{Bounds, LatLng};
use super::feature::{FeatureProperties, LineGeometry, LineStyle};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialExtent {
    /// `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: u32,
}

/// Startup visibility of the inventory and winter roads layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowLayers {
    pub incidents: bool,
    pub lane_closures: bool,
    pub future_lane_closures: bool,
    pub cameras: bool,
    pub message_signs: bool,
    pub traffic_speed: bool,
    pub wrs_segments: bool,
}

impl ShowLayers {
    /// Look up a flag by its wire name.
    pub fn is_shown(&self, key: &str) -> bool {
        match key {
            "incidents" => self.incidents,
            "laneClosures" => self.lane_closures,
            "futureLaneClosures" => self.future_lane_closures,
            "cameras" => self.cameras,
            "messageSigns" => self.message_signs,
            "trafficSpeed" => self.traffic_speed,
            "wrsSegments" => self.wrs_segments,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: LineGeometry,
}

impl GeoFeature {
    pub fn new(properties: FeatureProperties, geometry: LineGeometry) -> Self {
        Self {
            kind: "Feature".to_string(),
            properties,
            geometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<GeoFeature>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }
}

/// One feature layer as stored in the project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    pub layer_id: String,
    pub layer_name: String,
    #[serde(default)]
    pub expand: bool,
    #[serde(default)]
    pub group_color: Option<String>,
    #[serde(default)]
    pub group_style: Option<LineStyle>,
    #[serde(default)]
    pub startup_show: bool,
    #[serde(default)]
    pub layer_geo_json: FeatureCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub initial_extent: InitialExtent,
    pub bounds: Bounds,
    pub project_point_location: LatLng,
    #[serde(default)]
    pub show_layers: ShowLayers,
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
    /// Keys this crate does not interpret, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectConfig {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::SAMPLE;

    #[test]
    fn test_parse_sample() {
        let config: ProjectConfig = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(config.initial_extent.zoom, 12);
        assert!(config.show_layers.is_shown("trafficSpeed"));
        assert!(!config.show_layers.is_shown("cameras"));
        assert_eq!(config.layers[0].group_style, Some(LineStyle::Dashed));
        assert_eq!(config.layers[0].layer_geo_json.features[0].properties.feature_id, "f1");
        assert_eq!(config.extra["projectName"], "Verona Road");
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let config: ProjectConfig = serde_json::from_str(SAMPLE).unwrap();
        let value = config.to_value().unwrap();
        assert_eq!(value["projectName"], "Verona Road");
        assert_eq!(value["layers"][0]["layerGeoJson"]["type"], "FeatureCollection");
        assert_eq!(value["showLayers"]["wrsSegments"], false);
    }
}
