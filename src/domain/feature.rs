// Digitized feature domain model
use serde::{Deserialize, Serialize};

/// Generate a random identifier shaped like a UUID.
///
/// Existing ids are not checked for collisions.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Dash pattern handed to the renderer.
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some("7, 7"),
            LineStyle::Dotted => Some("3, 7"),
        }
    }

    /// CSS background used to draw a swatch of this style in `color`.
    pub fn swatch_css(self, color: &str) -> String {
        match self {
            LineStyle::Solid => format!("background-color: {};", color),
            LineStyle::Dashed => format!(
                "background-color: {};background-image: linear-gradient(90deg, transparent 50%, rgb(255, 255, 255) 50%);background-size: 15px 10px;",
                color
            ),
            LineStyle::Dotted => format!(
                "background-color: {};background-image: linear-gradient(90deg, transparent 50%, rgb(255, 255, 255) 50%);background-size: 7px 10px;",
                color
            ),
        }
    }
}

/// Line geometry of a digitized feature, in GeoJSON `[lng, lat]` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LineGeometry {
    LineString { coordinates: Vec<[f64; 2]> },
    MultiLineString { coordinates: Vec<Vec<[f64; 2]>> },
}

impl LineGeometry {
    pub fn vertex_count(&self) -> usize {
        match self {
            LineGeometry::LineString { coordinates } => coordinates.len(),
            LineGeometry::MultiLineString { coordinates } => coordinates.iter().map(Vec::len).sum(),
        }
    }
}

fn default_color() -> String {
    "#FF6600".to_string()
}

fn default_opacity() -> f64 {
    0.8
}

fn default_line_width() -> u32 {
    5
}

/// Display properties of one digitized feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub legend_show: bool,
    #[serde(default)]
    pub name: String,
    pub feature_id: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_line_width")]
    pub line_width: u32,
    #[serde(default)]
    pub initial_show: bool,
    #[serde(default)]
    pub line_style: LineStyle,
}

/// Values collected by the feature dialog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub legend_show: bool,
    #[serde(default)]
    pub initial_show: bool,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_line_width")]
    pub line_width: u32,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub line_style: LineStyle,
}

impl Default for FeatureForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            legend_show: false,
            initial_show: false,
            color: default_color(),
            line_width: default_line_width(),
            opacity: default_opacity(),
            line_style: LineStyle::Solid,
        }
    }
}

impl FeatureForm {
    pub fn from_properties(props: &FeatureProperties) -> Self {
        Self {
            name: props.name.clone(),
            legend_show: props.legend_show,
            initial_show: props.initial_show,
            color: props.color.clone(),
            line_width: props.line_width,
            opacity: props.opacity,
            line_style: props.line_style,
        }
    }

    pub fn into_properties(self, feature_id: String) -> FeatureProperties {
        FeatureProperties {
            color: self.color,
            legend_show: self.legend_show,
            name: self.name,
            feature_id,
            opacity: self.opacity,
            line_width: self.line_width,
            initial_show: self.initial_show,
            line_style: self.line_style,
        }
    }
}

/// Style applied to a rendered path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub color: String,
    pub opacity: f64,
    pub weight: u32,
    pub dash_array: Option<&'static str>,
    pub line_cap: &'static str,
    pub clickable: bool,
}

impl PathStyle {
    pub fn for_feature(props: &FeatureProperties) -> Self {
        Self {
            color: props.color.clone(),
            opacity: props.opacity,
            weight: props.line_width,
            dash_array: props.line_style.dash_array(),
            line_cap: "butt",
            clickable: !props.name.is_empty(),
        }
    }
}
