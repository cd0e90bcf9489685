// Feature layer - an ordered, named group of digitized features
use super::feature::{
    FeatureForm, FeatureProperties, LineGeometry, LineStyle, PathStyle, new_id,
};
use super::map_scene::{GeometryHandle, MapScene};
use super::markup::{checked_attr, escape_html, hex_to_css};
use super::project_config::{FeatureCollection, GeoFeature, LayerConfig};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExportError {
    #[error("layer {layer_id} lists feature {feature_id} but no such feature is tracked")]
    MissingFeature { layer_id: String, feature_id: String },
    #[error("feature {feature_id} has no geometry on the map")]
    MissingGeometry { feature_id: String },
    #[error("group order lists unknown layer {0}")]
    MissingLayer(String),
    #[error("could not serialize project configuration: {0}")]
    Serialize(String),
}

/// A digitized feature: its display record plus a reference to the geometry
/// held by the map scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: FeatureProperties,
    pub handle: GeometryHandle,
}

/// Values collected by the group dialog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupForm {
    pub name: String,
    #[serde(default)]
    pub expand: bool,
    #[serde(default)]
    pub group_color: Option<String>,
    #[serde(default)]
    pub group_style: Option<LineStyle>,
    #[serde(default)]
    pub startup_show: bool,
}

#[derive(Debug, Clone)]
pub struct FeatureLayer {
    pub id: String,
    pub name: String,
    /// Expanded layers keep per-feature color and style; collapsed layers draw
    /// every feature in the group color and style.
    pub expand: bool,
    pub group_color: Option<String>,
    pub group_style: Option<LineStyle>,
    pub startup_show: bool,
    // `order` and `features` always hold the same ids
    order: Vec<String>,
    features: HashMap<String, Feature>,
}

impl FeatureLayer {
    /// Rebuild a layer from its persisted form, putting every geometry on the map.
    pub fn from_config(config: LayerConfig, scene: &mut MapScene) -> Self {
        let mut layer = Self {
            id: config.layer_id,
            name: config.layer_name,
            expand: config.expand,
            group_color: config.group_color,
            group_style: config.group_style,
            startup_show: config.startup_show,
            order: Vec::new(),
            features: HashMap::new(),
        };

        for feature in config.layer_geo_json.features {
            layer.add_feature(scene, feature.geometry, feature.properties);
        }
        layer
    }

    /// Empty layer with a freshly generated id.
    pub fn new(form: GroupForm) -> Self {
        let mut layer = Self {
            id: new_id(),
            name: String::new(),
            expand: true,
            group_color: None,
            group_style: None,
            startup_show: false,
            order: Vec::new(),
            features: HashMap::new(),
        };
        layer.apply_form_fields(form);
        layer
    }

    fn apply_form_fields(&mut self, form: GroupForm) {
        self.name = form.name;
        self.expand = form.expand;
        self.startup_show = form.startup_show;
        if form.expand {
            self.group_color = None;
            self.group_style = None;
        } else {
            self.group_color = form.group_color;
            self.group_style = Some(form.group_style.unwrap_or_default());
        }
    }

    /// Append a feature and return its id.
    ///
    /// A feature whose id is already tracked replaces the earlier one in place.
    pub fn add_feature(
        &mut self,
        scene: &mut MapScene,
        geometry: LineGeometry,
        properties: FeatureProperties,
    ) -> String {
        let feature_id = properties.feature_id.clone();
        let handle = scene.add_path(geometry, self.path_style(&properties), popup_for(&properties));

        let previous = self.features.insert(feature_id.clone(), Feature { properties, handle });
        match previous {
            Some(old) => {
                tracing::warn!(layer = %self.id, feature = %feature_id, "duplicate feature id replaced");
                scene.remove_path(old.handle);
            }
            None => self.order.push(feature_id.clone()),
        }
        feature_id
    }

    /// Drop a feature from both bookkeeping structures and the map. Unknown ids
    /// are ignored.
    pub fn remove_feature(&mut self, scene: &mut MapScene, feature_id: &str) -> Option<Feature> {
        if let Some(pos) = self.order.iter().position(|id| id == feature_id) {
            self.order.remove(pos);
        }
        let removed = self.features.remove(feature_id);
        if let Some(feature) = &removed {
            scene.remove_path(feature.handle);
        }
        removed
    }

    /// Overwrite a feature's display properties from the dialog and restyle it.
    /// Collapsed layers keep the group color and style.
    pub fn update_feature(&mut self, scene: &mut MapScene, feature_id: &str, form: FeatureForm) -> bool {
        let form = self.conform(form);
        let Some(feature) = self.features.get_mut(feature_id) else {
            return false;
        };
        feature.properties = form.into_properties(feature_id.to_string());
        let (handle, props) = (feature.handle, feature.properties.clone());
        scene.restyle(handle, self.path_style(&props), popup_for(&props))
    }

    /// Force group color and style onto a form when the layer is collapsed.
    pub fn conform(&self, mut form: FeatureForm) -> FeatureForm {
        if !self.expand {
            if let Some(color) = &self.group_color {
                form.color = color.clone();
            }
            form.line_style = self.group_style.unwrap_or_default();
        }
        form
    }

    /// Apply the group dialog. Collapsing or editing a collapsed layer pushes the
    /// group color and style into every member's stored properties. Members are
    /// restyled either way.
    pub fn update_group(&mut self, scene: &mut MapScene, form: GroupForm) {
        self.apply_form_fields(form);
        if !self.expand {
            let color = self.group_color.clone();
            let style = self.group_style.unwrap_or_default();
            for id in &self.order {
                if let Some(feature) = self.features.get_mut(id) {
                    if let Some(color) = &color {
                        feature.properties.color = color.clone();
                    }
                    feature.properties.line_style = style;
                }
            }
        }
        self.restyle_all(scene);
    }

    fn restyle_all(&self, scene: &mut MapScene) {
        for feature in self.features() {
            scene.restyle(
                feature.handle,
                self.path_style(&feature.properties),
                popup_for(&feature.properties),
            );
        }
    }

    /// Move a feature to `index` in display order (clamped).
    pub fn move_feature(&mut self, feature_id: &str, index: usize) -> bool {
        let Some(pos) = self.order.iter().position(|id| id == feature_id) else {
            return false;
        };
        let id = self.order.remove(pos);
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        true
    }

    /// Rendered style of a member feature.
    pub fn path_style(&self, props: &FeatureProperties) -> PathStyle {
        let mut style = PathStyle::for_feature(props);
        if !self.expand {
            if let Some(color) = &self.group_color {
                style.color = color.clone();
            }
            style.dash_array = self.group_style.unwrap_or_default().dash_array();
        }
        style
    }

    pub fn feature(&self, feature_id: &str) -> Option<&Feature> {
        self.features.get(feature_id)
    }

    pub fn find_by_handle(&self, handle: GeometryHandle) -> Option<&Feature> {
        self.features.values().find(|f| f.handle == handle)
    }

    /// Members in display order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.order.iter().filter_map(|id| self.features.get(id))
    }

    pub fn feature_ids(&self) -> &[String] {
        &self.order
    }

    pub fn handles(&self) -> Vec<GeometryHandle> {
        self.features().map(|f| f.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True when the ordered list and the lookup track the same ids.
    pub fn is_consistent(&self) -> bool {
        self.order.len() == self.features.len() && self.order.iter().all(|id| self.features.contains_key(id))
    }

    /// Serialize in display order, reading geometry back from the scene.
    pub fn to_config(&self, scene: &MapScene) -> Result<LayerConfig, ExportError> {
        let mut collection = FeatureCollection::default();
        for feature_id in &self.order {
            let feature = self.features.get(feature_id).ok_or_else(|| ExportError::MissingFeature {
                layer_id: self.id.clone(),
                feature_id: feature_id.clone(),
            })?;
            let geometry = scene
                .geometry(feature.handle)
                .ok_or_else(|| ExportError::MissingGeometry { feature_id: feature_id.clone() })?;
            collection
                .features
                .push(GeoFeature::new(feature.properties.clone(), geometry.clone()));
        }

        Ok(LayerConfig {
            layer_id: self.id.clone(),
            layer_name: self.name.clone(),
            expand: self.expand,
            group_color: self.group_color.clone(),
            group_style: self.group_style,
            startup_show: self.startup_show,
            layer_geo_json: collection,
        })
    }

    fn swatch(&self, props: &FeatureProperties) -> String {
        let style = self.path_style(props);
        let line_style = if self.expand {
            props.line_style
        } else {
            self.group_style.unwrap_or_default()
        };
        line_style.swatch_css(&hex_to_css(&style.color, Some(props.opacity)))
    }

    fn group_swatch(&self) -> String {
        self.group_style
            .unwrap_or_default()
            .swatch_css(self.group_color.as_deref().unwrap_or(""))
    }

    /// Accordion header content.
    pub fn editor_header(&self) -> String {
        let marker = if self.expand {
            "<span title=\"Expand in legend\" class=\"ui-icon ui-icon-arrow-2-n-s\"></span>".to_string()
        } else {
            format!("<hr style=\"{}margin-right: 2px;\">", self.group_swatch())
        };
        format!("{}{}", escape_html(&self.name), marker)
    }

    /// Sortable list item for one feature. `wrap` adds the enclosing `<li>`.
    pub fn editor_item(&self, feature_id: &str, wrap: bool) -> Option<String> {
        let props = &self.features.get(feature_id)?.properties;
        let inner = format!(
            "{}<hr style=\"{}\">{}{}",
            escape_html(&props.name),
            self.swatch(props),
            if props.legend_show {
                "<span title=\"Show in legend\" class=\"ui-icon ui-icon-check\"></span>"
            } else {
                ""
            },
            if props.initial_show {
                "<span title=\"Show on startup\" class=\"ui-icon ui-icon-plusthick\"></span>"
            } else {
                ""
            },
        );

        Some(if wrap {
            format!("<li id=\"{}\" class=\"ui-state-default\">{}</li>", feature_id, inner)
        } else {
            inner
        })
    }

    /// Accordion pane with the sortable feature list.
    pub fn editor_markup(&self) -> String {
        let items: String = self
            .order
            .iter()
            .filter_map(|id| self.editor_item(id, true))
            .collect();
        format!(
            "<div id=\"{id}_group\" class=\"group\"><h3 id=\"{id}\">{header}</h3><div><ul id=\"{id}_ul\" class=\"layer-sort\">{items}</ul></div></div>",
            id = self.id,
            header = self.editor_header(),
            items = items,
        )
    }

    /// Legend tree entry. Every feature keeps a checkbox so the group checkbox
    /// still drives hidden members; collapsed layers show only the group swatch.
    pub fn legend_markup(&self) -> String {
        let mut markup = format!(
            "<li{}><input type=\"checkbox\" id=\"{id}\" class=\"chk-layer-group\" {checked}><label for=\"{id}\">{name}</label><ul style=\"{ul_style}\">",
            if self.expand { "" } else { " class=\"leaf\"" },
            id = self.id,
            checked = checked_attr(self.startup_show),
            name = escape_html(&self.name),
            ul_style = if self.expand { "" } else { "display: none;" },
        );

        for feature in self.features() {
            let props = &feature.properties;
            let hidden = !self.expand || !props.legend_show;
            let swatch = if self.expand {
                format!("<hr style=\"{}\">", self.swatch(props))
            } else {
                String::new()
            };
            markup.push_str(&format!(
                "<li style=\"{}\"><input id=\"{layer}_{fid}\" type=\"checkbox\" class=\"chk-layer-subgroup\" {checked}><label for=\"{layer}_{fid}\">{name}</label>{swatch}</li>",
                if hidden { "display: none;" } else { "" },
                layer = self.id,
                fid = props.feature_id,
                checked = checked_attr(props.initial_show && self.startup_show),
                name = escape_html(&props.name),
                swatch = swatch,
            ));
        }

        markup.push_str("</ul>");
        if !self.expand {
            markup.push_str(&format!("<hr style=\"{}\">", self.group_swatch()));
        }
        markup.push_str("</li>");
        markup
    }
}

fn popup_for(props: &FeatureProperties) -> Option<String> {
    if props.name.is_empty() {
        None
    } else {
        Some(props.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::SAMPLE;
    use crate::domain::project_config::ProjectConfig;
    use proptest::prelude::*;

    fn line(offset: f64) -> LineGeometry {
        LineGeometry::LineString {
            coordinates: vec![[-89.4 + offset, 43.0], [-89.3 + offset, 43.1]],
        }
    }

    fn props(id: &str) -> FeatureProperties {
        FeatureForm {
            name: format!("feature {}", id),
            ..FeatureForm::default()
        }
        .into_properties(id.to_string())
    }

    fn sample_layers(scene: &mut MapScene) -> Vec<FeatureLayer> {
        let config: ProjectConfig = serde_json::from_str(SAMPLE).unwrap();
        config
            .layers
            .into_iter()
            .map(|l| FeatureLayer::from_config(l, scene))
            .collect()
    }

    fn expanded_form(name: &str) -> GroupForm {
        GroupForm {
            name: name.to_string(),
            expand: true,
            group_color: None,
            group_style: None,
            startup_show: true,
        }
    }

    #[test]
    fn test_from_config_tracks_features_in_order() {
        let mut scene = MapScene::new();
        let layers = sample_layers(&mut scene);

        assert_eq!(layers[0].feature_ids(), ["f1", "f2"]);
        assert!(layers[0].is_consistent());
        assert_eq!(scene.path_count(), 3);
    }

    #[test]
    fn test_collapsed_layer_renders_in_group_style() {
        let mut scene = MapScene::new();
        let layers = sample_layers(&mut scene);
        let f2 = layers[0].feature("f2").unwrap();
        let path = scene.path(f2.handle).unwrap();

        assert_eq!(path.style.color, "#112233");
        assert_eq!(path.style.dash_array, Some("7, 7"));
        assert_eq!(path.style.weight, 8);
        // unnamed: no popup, not clickable
        assert_eq!(path.popup, None);
        assert!(!path.style.clickable);
    }

    #[test]
    fn test_new_layer_starts_empty() {
        let layer = FeatureLayer::new(GroupForm {
            name: "Closures".to_string(),
            expand: false,
            group_color: Some("#00FF00".to_string()),
            group_style: None,
            startup_show: true,
        });
        assert!(layer.is_empty());
        assert_eq!(layer.id.len(), 36);
        assert_eq!(layer.group_style, Some(LineStyle::Solid));
    }

    #[test]
    fn test_expanded_form_clears_group_style() {
        let layer = FeatureLayer::new(GroupForm {
            group_color: Some("#00FF00".to_string()),
            group_style: Some(LineStyle::Dotted),
            ..expanded_form("Closures")
        });
        assert_eq!(layer.group_color, None);
        assert_eq!(layer.group_style, None);
    }

    #[test]
    fn test_add_and_remove_feature() {
        let mut scene = MapScene::new();
        let mut layer = FeatureLayer::new(expanded_form("Closures"));

        let id = layer.add_feature(&mut scene, line(0.0), props("a"));
        assert_eq!(id, "a");
        assert_eq!(layer.len(), 1);
        let handle = layer.feature("a").unwrap().handle;
        assert_eq!(scene.path(handle).unwrap().popup.as_deref(), Some("feature a"));

        let removed = layer.remove_feature(&mut scene, "a").unwrap();
        assert_eq!(removed.handle, handle);
        assert!(scene.path(handle).is_none());
        assert!(layer.is_empty());
    }

    #[test]
    fn test_remove_absent_feature_is_noop() {
        let mut scene = MapScene::new();
        let mut layer = FeatureLayer::new(expanded_form("Closures"));
        layer.add_feature(&mut scene, line(0.0), props("a"));

        assert!(layer.remove_feature(&mut scene, "missing").is_none());
        assert!(layer.feature("a").is_some());
        assert_eq!(layer.feature_ids(), ["a"]);
        assert_eq!(scene.path_count(), 1);
    }

    #[test]
    fn test_duplicate_id_replaces_in_place() {
        let mut scene = MapScene::new();
        let mut layer = FeatureLayer::new(expanded_form("Closures"));
        layer.add_feature(&mut scene, line(0.0), props("a"));
        layer.add_feature(&mut scene, line(0.1), props("b"));
        layer.add_feature(&mut scene, line(0.2), props("a"));

        assert_eq!(layer.feature_ids(), ["a", "b"]);
        assert!(layer.is_consistent());
        assert_eq!(scene.path_count(), 2);
    }

    #[test]
    fn test_collapsing_group_propagates_color_and_style() {
        let mut scene = MapScene::new();
        let mut layer = FeatureLayer::new(expanded_form("Closures"));
        layer.add_feature(&mut scene, line(0.0), props("a"));
        layer.add_feature(&mut scene, line(0.1), props("b"));

        layer.update_group(
            &mut scene,
            GroupForm {
                name: "Closures".to_string(),
                expand: false,
                group_color: Some("#0000FF".to_string()),
                group_style: Some(LineStyle::Dotted),
                startup_show: true,
            },
        );

        for feature in layer.features() {
            assert_eq!(feature.properties.color, "#0000FF");
            assert_eq!(feature.properties.line_style, LineStyle::Dotted);
            let style = &scene.path(feature.handle).unwrap().style;
            assert_eq!(style.color, "#0000FF");
            assert_eq!(style.dash_array, Some("3, 7"));
        }
    }

    #[test]
    fn test_expanding_group_restyles_members_from_their_own_properties() {
        let mut scene = MapScene::new();
        let mut layer = FeatureLayer::new(GroupForm {
            name: "Detours".to_string(),
            expand: false,
            group_color: Some("#112233".to_string()),
            group_style: Some(LineStyle::Dashed),
            startup_show: true,
        });
        let mut own = props("red");
        own.color = "#FF0000".to_string();
        own.line_style = LineStyle::Solid;
        // loaded as stored, so the member keeps its own color under the collapsed group
        layer.add_feature(&mut scene, line(0.0), own);
        let handle = layer.feature("red").unwrap().handle;
        assert_eq!(scene.path(handle).unwrap().style.color, "#112233");

        layer.update_group(&mut scene, expanded_form("Detours"));

        let feature = layer.feature("red").unwrap();
        let rendered = &scene.path(handle).unwrap().style;
        assert_eq!(*rendered, layer.path_style(&feature.properties));
        assert_eq!(rendered.color, "#FF0000");
        assert_eq!(rendered.dash_array, None);
    }

    #[test]
    fn test_update_feature_in_collapsed_layer_keeps_group_color() {
        let mut scene = MapScene::new();
        let mut layers = sample_layers(&mut scene);
        let layer = &mut layers[0];

        let form = FeatureForm {
            name: "Renamed".to_string(),
            color: "#ABCDEF".to_string(),
            line_style: LineStyle::Solid,
            line_width: 14,
            ..FeatureForm::default()
        };
        assert!(layer.update_feature(&mut scene, "f2", form));

        let feature = layer.feature("f2").unwrap();
        assert_eq!(feature.properties.color, "#112233");
        assert_eq!(feature.properties.line_style, LineStyle::Dashed);
        assert_eq!(feature.properties.line_width, 14);
        let path = scene.path(feature.handle).unwrap();
        assert_eq!(path.popup.as_deref(), Some("Renamed"));
        assert_eq!(path.style.weight, 14);
    }

    #[test]
    fn test_move_feature() {
        let mut scene = MapScene::new();
        let mut layer = FeatureLayer::new(expanded_form("Closures"));
        for id in ["a", "b", "c"] {
            layer.add_feature(&mut scene, line(0.0), props(id));
        }
        assert!(layer.move_feature("c", 0));
        assert_eq!(layer.feature_ids(), ["c", "a", "b"]);
        assert!(layer.move_feature("c", 99));
        assert_eq!(layer.feature_ids(), ["a", "b", "c"]);
        assert!(!layer.move_feature("zzz", 0));
    }

    #[test]
    fn test_to_config_reads_edited_geometry() {
        let mut scene = MapScene::new();
        let layers = sample_layers(&mut scene);
        let handle = layers[0].feature("f1").unwrap().handle;
        scene.set_geometry(handle, line(1.0));

        let config = layers[0].to_config(&scene).unwrap();
        assert_eq!(config.layer_geo_json.features[0].geometry, line(1.0));
        assert_eq!(config.layer_geo_json.features[1].properties.feature_id, "f2");
    }

    #[test]
    fn test_to_config_fails_without_geometry() {
        let mut scene = MapScene::new();
        let layers = sample_layers(&mut scene);
        let handle = layers[0].feature("f2").unwrap().handle;
        scene.remove_path(handle);

        assert_eq!(
            layers[0].to_config(&scene),
            Err(ExportError::MissingGeometry { feature_id: "f2".to_string() })
        );
    }

    #[test]
    fn test_collapsed_legend_has_single_group_swatch() {
        let mut scene = MapScene::new();
        let layers = sample_layers(&mut scene);
        let legend = layers[0].legend_markup();

        assert!(legend.starts_with("<li class=\"leaf\">"));
        assert_eq!(legend.matches("<hr").count(), 1);
        assert!(legend.contains("background-color: #112233;"));
        // members keep their checkboxes
        assert_eq!(legend.matches("chk-layer-subgroup").count(), 2);
        assert!(legend.contains("id=\"g1_f1\" type=\"checkbox\" class=\"chk-layer-subgroup\" checked"));
        assert!(legend.contains("<ul style=\"display: none;\">"));
    }

    #[test]
    fn test_expanded_legend_hides_legend_hidden_features() {
        let mut scene = MapScene::new();
        let layers = sample_layers(&mut scene);
        let legend = layers[1].legend_markup();

        assert!(legend.starts_with("<li><input"));
        assert!(legend.contains("<li style=\"display: none;\"><input id=\"g2_f3\""));
        assert!(legend.contains("rgba(255, 102, 0, 1)"));
        // group not shown at startup, so members start unchecked
        assert!(!legend.contains("checked"));
    }

    #[test]
    fn test_editor_markup() {
        let mut scene = MapScene::new();
        let layers = sample_layers(&mut scene);

        let markup = layers[0].editor_markup();
        assert!(markup.starts_with("<div id=\"g1_group\" class=\"group\"><h3 id=\"g1\">Detours<hr style="));
        assert!(markup.contains("<ul id=\"g1_ul\" class=\"layer-sort\"><li id=\"f1\" class=\"ui-state-default\">North leg"));
        assert!(markup.contains("ui-icon-plusthick"));

        let header = layers[1].editor_header();
        assert!(header.contains("ui-icon-arrow-2-n-s"));
        let item = layers[1].editor_item("f3", false).unwrap();
        assert!(item.starts_with("Stage 1<hr style=\"background-color: rgba(255, 102, 0, 1);\">"));
        assert!(!item.contains("ui-icon-check"));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(u8),
        Move(u8, usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..12).prop_map(Op::Add),
            (0u8..12).prop_map(Op::Remove),
            (0u8..12, 0usize..12).prop_map(|(id, to)| Op::Move(id, to)),
        ]
    }

    proptest! {
        #[test]
        fn prop_order_and_lookup_hold_same_members(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut scene = MapScene::new();
            let mut layer = FeatureLayer::new(expanded_form("Closures"));

            for op in ops {
                match op {
                    Op::Add(id) => {
                        layer.add_feature(&mut scene, line(0.0), props(&id.to_string()));
                    }
                    Op::Remove(id) => {
                        layer.remove_feature(&mut scene, &id.to_string());
                    }
                    Op::Move(id, to) => {
                        layer.move_feature(&id.to_string(), to);
                    }
                }
                prop_assert!(layer.is_consistent());
                prop_assert_eq!(scene.path_count(), layer.len());
            }
        }
    }
}
