// Inventory layers - read-only traveler information resources
use super::bounds::Bounds;
use super::feature::PathStyle;
use super::markup::{checked_attr, fill_template, legend_sub_item};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SPEED_PROPERTY: &str = "speed-average_mph";
const SPEED_RESOURCE: &str = "linkwithspeed";

/// Color bucket for the traffic speed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedBucket {
    FiftyFivePlus,
    FortyFiveToFiftyFive,
    ThirtyToFortyFive,
    TwentyToThirty,
    LessThanTwenty,
    NoData,
}

impl SpeedBucket {
    /// Legend order.
    pub const ALL: [SpeedBucket; 6] = [
        SpeedBucket::FiftyFivePlus,
        SpeedBucket::FortyFiveToFiftyFive,
        SpeedBucket::ThirtyToFortyFive,
        SpeedBucket::TwentyToThirty,
        SpeedBucket::LessThanTwenty,
        SpeedBucket::NoData,
    ];

    /// Exactly 55 lands in the 45-55 bucket. Missing or zero speed means no data.
    pub fn classify(speed: Option<f64>) -> Self {
        match speed {
            None => SpeedBucket::NoData,
            Some(s) if s == 0.0 || s.is_nan() => SpeedBucket::NoData,
            Some(s) if s > 55.0 => SpeedBucket::FiftyFivePlus,
            Some(s) if s >= 45.0 => SpeedBucket::FortyFiveToFiftyFive,
            Some(s) if s >= 30.0 => SpeedBucket::ThirtyToFortyFive,
            Some(s) if s >= 20.0 => SpeedBucket::TwentyToThirty,
            Some(_) => SpeedBucket::LessThanTwenty,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SpeedBucket::FiftyFivePlus => "#149F08",
            SpeedBucket::FortyFiveToFiftyFive => "#2CDC11",
            SpeedBucket::ThirtyToFortyFive => "#3FC5DC",
            SpeedBucket::TwentyToThirty => "#DC8FAB",
            SpeedBucket::LessThanTwenty => "#FF0000",
            SpeedBucket::NoData => "#9C9C9C",
        }
    }

    pub fn legend_label(self) -> &'static str {
        match self {
            SpeedBucket::FiftyFivePlus => "&#8805; 55",
            SpeedBucket::FortyFiveToFiftyFive => "45 - 55",
            SpeedBucket::ThirtyToFortyFive => "30 - 45",
            SpeedBucket::TwentyToThirty => "20 - 30",
            SpeedBucket::LessThanTwenty => "&lt; 20",
            SpeedBucket::NoData => "No Data",
        }
    }
}

/// Static description of one inventory resource.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryResource {
    pub layer_name: &'static str,
    pub resource: &'static str,
    pub popup_template: &'static str,
    pub popup_properties: &'static [&'static str],
    pub icon_url: Option<&'static str>,
    /// Key in the project's `showLayers` block.
    pub visibility_key: &'static str,
}

/// Resources offered by the 511 inventory API, in legend order.
pub fn catalog() -> Vec<InventoryResource> {
    vec![
        InventoryResource {
            layer_name: "Incidents",
            resource: "INCIDENT",
            popup_template: "<p>{0}</p>",
            popup_properties: &[
                "event-element-details_event-element-detail_element-descriptions_element-description_additional-text_description",
            ],
            icon_url: Some("icons/incident.png"),
            visibility_key: "incidents",
        },
        InventoryResource {
            layer_name: "Lane Closures",
            resource: "LCSCURRENT",
            popup_template: "<p>Description: {0}<br/>Detour: {1}<br/>Start: {2}<br/>End: {3}</p>",
            popup_properties: &["Description", "Detour", "StartDate", "EndDate"],
            icon_url: Some("icons/roadclosure.png"),
            visibility_key: "laneClosures",
        },
        InventoryResource {
            layer_name: "Future Lane Closures",
            resource: "LCSFUTURE",
            popup_template: "<p>Description: {0}<br/>Start: {1}<br/>End: {2}</p>",
            popup_properties: &["Description", "StartDate", "EndDate"],
            icon_url: Some("icons/futureroadclosure.png"),
            visibility_key: "futureLaneClosures",
        },
        InventoryResource {
            layer_name: "Cameras",
            resource: "cctv",
            popup_template: "<img src=\"http://{0}\" width=240>",
            popup_properties: &["URL"],
            icon_url: Some("icons/camera.png"),
            visibility_key: "cameras",
        },
        InventoryResource {
            layer_name: "Message Signs",
            resource: "signwithmessage",
            popup_template: "<p style=\"background-color: black; color: yellow; min-height: 40px; width: 180px; padding: 10px;\">{0}</p>",
            popup_properties: &["dms-current-message"],
            icon_url: Some("icons/messagesign.png"),
            visibility_key: "messageSigns",
        },
        InventoryResource {
            layer_name: "Traffic Speed (mph)",
            resource: "LINKWITHSPEED",
            popup_template: "<p>Current Speed: {0}</p>",
            popup_properties: &[SPEED_PROPERTY],
            icon_url: Some("icons/traffic.png"),
            visibility_key: "trafficSpeed",
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconSpec {
    pub icon_url: String,
    pub icon_size: [u32; 2],
    pub icon_anchor: [u32; 2],
    pub popup_anchor: [i32; 2],
}

impl IconSpec {
    pub fn legend_icon(url: &str) -> IconSpec {
        IconSpec {
            icon_url: url.to_string(),
            icon_size: [20, 20],
            icon_anchor: [10, 10],
            popup_anchor: [10, 10],
        }
    }
}

/// How a remote feature is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Symbol {
    Line(PathStyle),
    Icon(IconSpec),
}

/// GeoJSON feature as returned by a remote resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteFeature {
    #[serde(default)]
    pub geometry: Value,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteFeatureCollection {
    #[serde(default)]
    pub features: Vec<RemoteFeature>,
}

/// Feature ready for display: geometry, popup markup and symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFeature {
    pub geometry: Value,
    pub properties: Map<String, Value>,
    pub popup: String,
    pub symbol: Symbol,
}

fn property_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn property_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One inventory resource bound to the project bounds.
#[derive(Debug, Clone)]
pub struct InventoryLayer {
    pub id: String,
    pub name: String,
    pub source_url: String,
    pub resource: InventoryResource,
    pub icon: Option<IconSpec>,
    pub startup_show: bool,
    bounds: Bounds,
    speed_colors: bool,
}

impl InventoryLayer {
    pub fn new(resource: InventoryResource, source_url: &str, bounds: Bounds, startup_show: bool) -> Self {
        Self {
            id: resource.layer_name.replace(' ', ""),
            name: resource.layer_name.to_string(),
            source_url: source_url.to_string(),
            icon: resource.icon_url.map(IconSpec::legend_icon),
            speed_colors: resource.resource.eq_ignore_ascii_case(SPEED_RESOURCE),
            resource,
            startup_show,
            bounds,
        }
    }

    pub fn has_speed_colors(&self) -> bool {
        self.speed_colors
    }

    /// Bounding box, resource and response format.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.bounds.query_params();
        params.push(("resource", self.resource.resource.to_string()));
        params.push(("format", "json".to_string()));
        params
    }

    pub fn popup(&self, properties: &Map<String, Value>) -> String {
        let values: Vec<String> = self
            .resource
            .popup_properties
            .iter()
            .map(|name| property_text(properties.get(*name)))
            .collect();
        fill_template(self.resource.popup_template, &values)
    }

    pub fn symbol(&self, properties: &Map<String, Value>) -> Symbol {
        if self.speed_colors {
            let bucket = SpeedBucket::classify(property_number(properties.get(SPEED_PROPERTY)));
            return Symbol::Line(PathStyle {
                color: bucket.color().to_string(),
                opacity: 0.4,
                weight: 10,
                dash_array: None,
                line_cap: "butt",
                clickable: true,
            });
        }
        match &self.icon {
            Some(icon) => Symbol::Icon(icon.clone()),
            None => Symbol::Icon(IconSpec::legend_icon("")),
        }
    }

    pub fn render(&self, feature: RemoteFeature) -> RenderedFeature {
        RenderedFeature {
            popup: self.popup(&feature.properties),
            symbol: self.symbol(&feature.properties),
            geometry: feature.geometry,
            properties: feature.properties,
        }
    }

    pub fn legend_markup(&self) -> String {
        let mut markup = format!(
            "<li class=\"{}\"><input id=\"{id}\" class=\"chk-inventory\" type=\"checkbox\" {checked}><label for=\"{id}\">{name}</label>",
            if self.speed_colors { "collapsed" } else { "" },
            id = self.id,
            checked = checked_attr(self.startup_show),
            name = self.name,
        );

        if let Some(url) = self.resource.icon_url {
            markup.push_str(&format!("<img src=\"{}\" height=15 class=\"legend-icon\">", url));
        }

        if self.speed_colors {
            markup.push_str("<ul>");
            for bucket in SpeedBucket::ALL {
                markup.push_str(&legend_sub_item(bucket.legend_label(), bucket.color()));
            }
            markup.push_str("</ul>");
        }

        markup.push_str("</li>");
        markup
    }
}
