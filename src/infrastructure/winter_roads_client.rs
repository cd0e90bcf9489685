// ArcGIS winter road conditions client
use crate::application::layer_feed::FeatureSource;
use crate::domain::bounds::Bounds;
use crate::domain::feature::LineGeometry;
use crate::domain::inventory::RenderedFeature;
use crate::domain::winter_roads::{RoadSegment, apply_aliases};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EsriResponse {
    #[serde(default)]
    field_aliases: HashMap<String, String>,
    #[serde(default)]
    features: Vec<EsriFeature>,
    #[serde(default)]
    error: Option<EsriError>,
}

#[derive(Debug, Deserialize)]
struct EsriFeature {
    #[serde(default)]
    attributes: Map<String, Value>,
    geometry: Option<EsriPolyline>,
}

#[derive(Debug, Deserialize)]
struct EsriPolyline {
    #[serde(default)]
    paths: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Deserialize)]
struct EsriError {
    code: i64,
    #[serde(default)]
    message: String,
}

fn to_geometry(mut paths: Vec<Vec<[f64; 2]>>) -> LineGeometry {
    if paths.len() == 1 {
        LineGeometry::LineString { coordinates: paths.remove(0) }
    } else {
        LineGeometry::MultiLineString { coordinates: paths }
    }
}

/// Turn a query response into segments with aliased properties. Features
/// without geometry are skipped.
pub fn parse_response(body: &str) -> Result<Vec<RoadSegment>> {
    let response: EsriResponse = serde_json::from_str(body).context("Failed to parse winter roads response")?;
    if let Some(error) = response.error {
        anyhow::bail!("Winter roads query failed ({}): {}", error.code, error.message);
    }

    let aliases = response.field_aliases;
    Ok(response
        .features
        .into_iter()
        .filter_map(|f| {
            let geometry = f.geometry.filter(|g| !g.paths.is_empty())?;
            Some(RoadSegment {
                geometry: to_geometry(geometry.paths),
                properties: apply_aliases(f.attributes, &aliases),
            })
        })
        .collect())
}

pub struct WinterRoadsClient {
    url: String,
    bounds: Bounds,
    client: reqwest::Client,
}

impl WinterRoadsClient {
    pub fn new(url: impl Into<String>, bounds: Bounds, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            bounds,
            client,
        }
    }

    /// Segments intersecting the project bounds, in WGS84.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let polygon = json!({
            "rings": [self.bounds.ring()],
            "spatialReference": {"wkid": 4326}
        });
        vec![
            ("geometry", polygon.to_string()),
            ("geometryType", "esriGeometryPolygon".to_string()),
            ("inSR", "4326".to_string()),
            ("spatialRel", "esriSpatialRelIntersects".to_string()),
            ("outFields", "*".to_string()),
            ("outSR", "4326".to_string()),
            ("f", "json".to_string()),
        ]
    }
}

#[async_trait]
impl FeatureSource for WinterRoadsClient {
    async fn fetch(&self) -> Result<Vec<RenderedFeature>> {
        let response = self
            .client
            .get(&self.url)
            .query(&self.query_params())
            .send()
            .await
            .context("Failed to request winter roads")?;

        if !response.status().is_success() {
            anyhow::bail!("Winter roads request failed with status {}", response.status());
        }

        let body = response.text().await.context("Failed to read winter roads response")?;
        Ok(parse_response(&body)?.into_iter().map(RoadSegment::render).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::Symbol;

    const RESPONSE: &str = r#"{
        "displayFieldName": "HWYLIST",
        "fieldAliases": {"F_HWY": "HWYLIST", "F_COND": "CONDITION", "F_SEG": "SEGMENTID"},
        "geometryType": "esriGeometryPolyline",
        "features": [
            {"attributes": {"F_HWY": "US 18", "F_COND": "Snow Covered", "F_SEG": 17},
             "geometry": {"paths": [[[-89.45, 43.05], [-89.40, 43.08]]]}},
            {"attributes": {"F_HWY": "WIS 69", "F_COND": "Good Winter Driving", "F_SEG": 18},
             "geometry": {"paths": [[[-89.45, 43.05], [-89.44, 43.06]], [[-89.43, 43.07], [-89.42, 43.08]]]}},
            {"attributes": {"F_HWY": "CTH PD", "F_COND": "No Information", "F_SEG": 19}}
        ]
    }"#;

    #[test]
    fn test_parse_response() {
        let segments = parse_response(RESPONSE).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].properties["CONDITION"], "Snow Covered");
        assert_eq!(segments[0].properties["SEGMENTID"], 17);
        assert!(matches!(segments[0].geometry, LineGeometry::LineString { .. }));
        assert!(matches!(segments[1].geometry, LineGeometry::MultiLineString { .. }));
        assert_eq!(segments[1].geometry.vertex_count(), 4);
    }

    #[test]
    fn test_rendered_segment() {
        let rendered = parse_response(RESPONSE).unwrap().remove(0).render();
        assert!(rendered.popup.starts_with("<b>US 18</b> between"));
        match rendered.symbol {
            Symbol::Line(style) => assert_eq!(style.color, "#5DAFE9"),
            other => panic!("unexpected symbol {:?}", other),
        }
        assert_eq!(rendered.geometry["type"], "LineString");
    }

    #[test]
    fn test_service_error() {
        let err = parse_response(r#"{"error": {"code": 400, "message": "Invalid query"}}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid query"));
    }

    #[test]
    fn test_query_params_intersect_bounds() {
        let client = WinterRoadsClient::new(
            "http://example.test/query",
            Bounds { south: 43.0, west: -89.5, north: 43.2, east: -89.3 },
            reqwest::Client::new(),
        );
        let params: HashMap<_, _> = client.query_params().into_iter().collect();
        assert_eq!(params["outSR"], "4326");
        assert_eq!(params["f"], "json");
        assert_eq!(params["spatialRel"], "esriSpatialRelIntersects");
        let polygon: Value = serde_json::from_str(&params["geometry"]).unwrap();
        assert_eq!(polygon["rings"][0].as_array().unwrap().len(), 5);
    }
}
