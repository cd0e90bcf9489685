// Winter road condition segments
use super::feature::{LineGeometry, PathStyle};
use super::inventory::{RenderedFeature, Symbol};
use super::markup::{checked_attr, fill_template, legend_sub_item};
use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const LAYER_ID: &str = "wrsSegments";

const POPUP_TEMPLATE: &str =
    "<b>{0}</b> between <br/><b>{1}</b> and <b>{2}</b><hr/><b>{3}</b><br/><i>Segment {4}</i>";
const POPUP_FIELDS: [&str; 5] = ["HWYLIST", "START_CITY", "END_CITY", "CONDITION", "SEGMENTID"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadCondition {
    GoodWinterDriving,
    SlipperyStretches,
    SnowCovered,
    IceCovered,
    TravelNotAdvised,
    NoInformation,
}

impl RoadCondition {
    /// Legend order.
    pub const ALL: [RoadCondition; 6] = [
        RoadCondition::GoodWinterDriving,
        RoadCondition::SlipperyStretches,
        RoadCondition::SnowCovered,
        RoadCondition::IceCovered,
        RoadCondition::TravelNotAdvised,
        RoadCondition::NoInformation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RoadCondition::GoodWinterDriving => "Good Winter Driving",
            RoadCondition::SlipperyStretches => "Slippery Stretches",
            RoadCondition::SnowCovered => "Snow Covered",
            RoadCondition::IceCovered => "Ice Covered",
            RoadCondition::TravelNotAdvised => "Travel Not Advised",
            RoadCondition::NoInformation => "No Information",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RoadCondition::GoodWinterDriving => "#33CC00",
            RoadCondition::SlipperyStretches => "#D176A2",
            RoadCondition::SnowCovered => "#5DAFE9",
            RoadCondition::IceCovered => "#FF0000",
            RoadCondition::TravelNotAdvised => "#000000",
            RoadCondition::NoInformation => "#808080",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Winter road reports are published October through May.
pub fn in_season(date: NaiveDate) -> bool {
    let month = date.month();
    month <= 5 || month >= 10
}

/// Rename attribute codes to their field aliases. Codes without an alias keep
/// their code as the name.
pub fn apply_aliases(attributes: Map<String, Value>, aliases: &HashMap<String, String>) -> Map<String, Value> {
    attributes
        .into_iter()
        .map(|(code, value)| match aliases.get(&code) {
            Some(alias) => (alias.clone(), value),
            None => (code, value),
        })
        .collect()
}

/// One road segment with aliased properties.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    pub geometry: LineGeometry,
    pub properties: Map<String, Value>,
}

impl RoadSegment {
    pub fn condition(&self) -> Option<RoadCondition> {
        self.properties
            .get("CONDITION")
            .and_then(Value::as_str)
            .and_then(RoadCondition::from_label)
    }

    pub fn popup(&self) -> String {
        let values: Vec<String> = POPUP_FIELDS
            .iter()
            .map(|field| match self.properties.get(*field) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        fill_template(POPUP_TEMPLATE, &values)
    }

    /// Unknown conditions are drawn as "No Information".
    pub fn style(&self) -> PathStyle {
        let condition = self.condition().unwrap_or(RoadCondition::NoInformation);
        PathStyle {
            color: condition.color().to_string(),
            opacity: 1.0,
            weight: 5,
            dash_array: None,
            line_cap: "round",
            clickable: true,
        }
    }

    pub fn render(self) -> RenderedFeature {
        RenderedFeature {
            popup: self.popup(),
            symbol: Symbol::Line(self.style()),
            geometry: serde_json::to_value(&self.geometry).unwrap_or(Value::Null),
            properties: self.properties,
        }
    }
}

pub fn legend_markup(startup_show: bool) -> String {
    let mut markup = format!(
        "<li class=\"collapsed\"><input id=\"{id}\" type=\"checkbox\" {checked}><label for=\"{id}\">Winter Roads</label>",
        id = LAYER_ID,
        checked = checked_attr(startup_show),
    );
    markup.push_str("<img src=\"icons/snow-report.png\" height=15 class=\"legend-icon\">");
    markup.push_str("<ul>");
    for condition in RoadCondition::ALL {
        markup.push_str(&legend_sub_item(condition.label(), condition.color()));
    }
    markup.push_str("</ul></li>");
    markup
}
