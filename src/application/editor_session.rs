// Editor session - layer selection, dialogs and export for one project
use crate::domain::bounds::{Bounds, LatLng};
use crate::domain::feature::{FeatureForm, LineGeometry, new_id};
use crate::domain::feature_layer::{ExportError, FeatureLayer, GroupForm};
use crate::domain::map_scene::{DrawControl, MapScene};
use crate::domain::project_config::{InitialExtent, ProjectConfig, ShowLayers};
use std::collections::HashMap;
use thiserror::Error;

/// Problems reported back to the operator. The action is aborted and nothing
/// changes.
#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    #[error("open a layer group first")]
    NoLayerSelected,
    #[error("close the open layer group first")]
    LayerOpen,
    #[error("unknown layer group {0}")]
    UnknownLayer(String),
    #[error("unknown feature {0}")]
    UnknownFeature(String),
    #[error("no feature is being drawn or edited")]
    NoFeatureDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Layer(String),
}

/// Which toolbar actions are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionState {
    /// Edit or delete group.
    pub layer_open_actions: bool,
    /// Create group, set extent, set bounds, inventory visibility.
    pub layer_closed_actions: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum FeatureDraft {
    New(LineGeometry),
    Existing(String),
}

pub struct EditorSession {
    // `layers` is rebuilt from `layer_order` and `layer_index` on export
    config: ProjectConfig,
    layer_order: Vec<String>,
    layer_index: HashMap<String, FeatureLayer>,
    scene: MapScene,
    selection: Selection,
    draft: Option<FeatureDraft>,
}

impl EditorSession {
    pub fn from_config(mut config: ProjectConfig) -> Self {
        if !config.bounds.is_valid() {
            tracing::warn!(bounds = ?config.bounds, "project bounds are inverted or empty");
        }

        let mut scene = MapScene::new();
        scene.set_shade(config.bounds.shade_rings());
        scene.set_marker_position(config.project_point_location);
        scene.set_marker_visible(true);

        let layer_configs = std::mem::take(&mut config.layers);
        let mut session = Self {
            config,
            layer_order: Vec::new(),
            layer_index: HashMap::new(),
            scene,
            selection: Selection::None,
            draft: None,
        };

        for layer_config in layer_configs {
            let layer = FeatureLayer::from_config(layer_config, &mut session.scene);
            session.insert_layer(layer);
        }

        tracing::debug!(
            layers = session.layer_order.len(),
            paths = session.scene.path_count(),
            "editor session loaded"
        );
        session
    }

    fn insert_layer(&mut self, layer: FeatureLayer) {
        let id = layer.id.clone();
        if let Some(old) = self.layer_index.insert(id.clone(), layer) {
            tracing::warn!(layer = %id, "duplicate layer id replaced");
            for handle in old.handles() {
                self.scene.remove_path(handle);
            }
        } else {
            self.layer_order.push(id);
        }
    }

    pub fn scene(&self) -> &MapScene {
        &self.scene
    }

    #[cfg(test)]
    pub(crate) fn scene_mut(&mut self) -> &mut MapScene {
        &mut self.scene
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn bounds(&self) -> Bounds {
        self.config.bounds
    }

    pub fn initial_extent(&self) -> &InitialExtent {
        &self.config.initial_extent
    }

    pub fn project_point(&self) -> LatLng {
        self.config.project_point_location
    }

    pub fn show_layers(&self) -> ShowLayers {
        self.config.show_layers
    }

    pub fn layer(&self, layer_id: &str) -> Option<&FeatureLayer> {
        self.layer_index.get(layer_id)
    }

    /// Layers in group order.
    pub fn layers(&self) -> impl Iterator<Item = &FeatureLayer> {
        self.layer_order.iter().filter_map(|id| self.layer_index.get(id))
    }

    pub fn layer_ids(&self) -> &[String] {
        &self.layer_order
    }

    pub fn selected_layer(&self) -> Option<&FeatureLayer> {
        match &self.selection {
            Selection::Layer(id) => self.layer_index.get(id),
            Selection::None => None,
        }
    }

    fn selected_id(&self) -> Result<String, EditorError> {
        match &self.selection {
            Selection::Layer(id) => Ok(id.clone()),
            Selection::None => Err(EditorError::NoLayerSelected),
        }
    }

    pub fn action_state(&self) -> ActionState {
        let open = matches!(self.selection, Selection::Layer(_));
        ActionState {
            layer_open_actions: open,
            layer_closed_actions: !open,
        }
    }

    /// Accordion pane opened: that layer's features become the editable set.
    pub fn open_pane(&mut self, layer_id: &str) -> Result<(), EditorError> {
        let handles = self
            .layer_index
            .get(layer_id)
            .ok_or_else(|| EditorError::UnknownLayer(layer_id.to_string()))?
            .handles();

        self.scene.clear_editable();
        self.scene.set_marker_visible(false);
        self.scene.set_draw_control(Some(DrawControl::Polyline));
        for handle in handles {
            self.scene.add_editable(handle);
        }
        self.selection = Selection::Layer(layer_id.to_string());
        self.draft = None;
        tracing::debug!(layer = %layer_id, "layer selected");
        Ok(())
    }

    /// Accordion collapsed: nothing editable, project marker back on the map.
    pub fn close_pane(&mut self) {
        self.scene.clear_editable();
        self.scene.set_draw_control(None);
        self.scene.set_marker_visible(true);
        self.selection = Selection::None;
        self.draft = None;
    }

    /// Arm the rectangle tool for redrawing the project bounds.
    pub fn begin_bounds_edit(&mut self) -> Result<(), EditorError> {
        if self.selection != Selection::None {
            return Err(EditorError::LayerOpen);
        }
        self.scene.set_draw_control(Some(DrawControl::Rectangle));
        Ok(())
    }

    /// Rectangle finished: new bounds, project point moved to its middle.
    pub fn rectangle_drawn(&mut self, corner_a: LatLng, corner_b: LatLng) -> Bounds {
        let bounds = Bounds::from_corners(corner_a, corner_b);
        self.scene.set_draw_control(None);
        self.set_bounds(bounds);
        self.move_project_point(bounds.center());
        bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.scene.set_shade(bounds.shade_rings());
        self.config.bounds = bounds;
    }

    pub fn move_project_point(&mut self, point: LatLng) {
        self.scene.set_marker_position(point);
        self.config.project_point_location = point;
    }

    pub fn set_initial_extent(&mut self, center: LatLng, zoom: u32) {
        self.config.initial_extent = InitialExtent {
            center: [center.lat, center.lng],
            zoom,
        };
    }

    pub fn set_inventory_visibility(&mut self, show_layers: ShowLayers) {
        self.config.show_layers = show_layers;
    }

    /// A polyline was drawn in the open layer. Returns the prefilled dialog.
    pub fn polyline_drawn(&mut self, geometry: LineGeometry) -> Result<FeatureForm, EditorError> {
        self.selected_id()?;
        self.draft = Some(FeatureDraft::New(geometry));
        self.feature_form()
    }

    /// Start editing an existing feature of the open layer.
    pub fn edit_feature(&mut self, feature_id: &str) -> Result<FeatureForm, EditorError> {
        let layer_id = self.selected_id()?;
        let known = self
            .layer_index
            .get(&layer_id)
            .is_some_and(|layer| layer.feature(feature_id).is_some());
        if !known {
            return Err(EditorError::UnknownFeature(feature_id.to_string()));
        }
        self.draft = Some(FeatureDraft::Existing(feature_id.to_string()));
        self.feature_form()
    }

    /// Dialog contents for the current draft.
    pub fn feature_form(&self) -> Result<FeatureForm, EditorError> {
        let layer = self.selected_layer().ok_or(EditorError::NoLayerSelected)?;
        match &self.draft {
            Some(FeatureDraft::New(_)) => Ok(layer.conform(FeatureForm::default())),
            Some(FeatureDraft::Existing(id)) => layer
                .feature(id)
                .map(|f| layer.conform(FeatureForm::from_properties(&f.properties)))
                .ok_or_else(|| EditorError::UnknownFeature(id.clone())),
            None => Err(EditorError::NoFeatureDraft),
        }
    }

    /// Feature dialog "Save". Returns the feature id. On error the draft is
    /// kept so the dialog can be retried.
    pub fn save_feature(&mut self, form: FeatureForm) -> Result<String, EditorError> {
        let draft = self.draft.clone().ok_or(EditorError::NoFeatureDraft)?;
        let layer_id = self.selected_id()?;
        let scene = &mut self.scene;
        let layer = self
            .layer_index
            .get_mut(&layer_id)
            .ok_or_else(|| EditorError::UnknownLayer(layer_id.clone()))?;

        let feature_id = match draft {
            FeatureDraft::New(geometry) => {
                let properties = layer.conform(form).into_properties(new_id());
                let feature_id = layer.add_feature(scene, geometry, properties);
                if let Some(feature) = layer.feature(&feature_id) {
                    scene.add_editable(feature.handle);
                }
                tracing::info!(layer = %layer_id, feature = %feature_id, "feature added");
                feature_id
            }
            FeatureDraft::Existing(feature_id) => {
                if !layer.update_feature(scene, &feature_id, form) {
                    return Err(EditorError::UnknownFeature(feature_id));
                }
                feature_id
            }
        };
        self.draft = None;
        Ok(feature_id)
    }

    /// Feature dialog "Delete". A feature still being drawn is just discarded.
    pub fn delete_feature(&mut self) -> Result<Option<String>, EditorError> {
        let feature_id = match &self.draft {
            None => return Err(EditorError::NoFeatureDraft),
            Some(FeatureDraft::New(_)) => None,
            Some(FeatureDraft::Existing(id)) => Some(id.clone()),
        };
        let Some(feature_id) = feature_id else {
            self.draft = None;
            return Ok(None);
        };

        let layer_id = self.selected_id()?;
        let scene = &mut self.scene;
        let layer = self
            .layer_index
            .get_mut(&layer_id)
            .ok_or(EditorError::UnknownLayer(layer_id))?;
        layer
            .remove_feature(scene, &feature_id)
            .ok_or_else(|| EditorError::UnknownFeature(feature_id.clone()))?;
        self.draft = None;
        tracing::info!(feature = %feature_id, "feature deleted");
        Ok(Some(feature_id))
    }

    pub fn cancel_feature(&mut self) {
        self.draft = None;
    }

    /// Group dialog contents: the open layer, or defaults for a new group.
    pub fn group_form(&self) -> GroupForm {
        match self.selected_layer() {
            Some(layer) => GroupForm {
                name: layer.name.clone(),
                expand: layer.expand,
                group_color: layer.group_color.clone(),
                group_style: layer.group_style,
                startup_show: layer.startup_show,
            },
            None => GroupForm {
                name: String::new(),
                expand: true,
                group_color: None,
                group_style: None,
                startup_show: true,
            },
        }
    }

    /// Group dialog "Save": update the open layer, or append a new one when no
    /// layer is open. Returns the layer id.
    pub fn save_group(&mut self, form: GroupForm) -> Result<String, EditorError> {
        match self.selection.clone() {
            Selection::Layer(id) => {
                let scene = &mut self.scene;
                let layer = self
                    .layer_index
                    .get_mut(&id)
                    .ok_or_else(|| EditorError::UnknownLayer(id.clone()))?;
                layer.update_group(scene, form);
                Ok(id)
            }
            Selection::None => {
                let layer = FeatureLayer::new(form);
                let id = layer.id.clone();
                self.insert_layer(layer);
                tracing::info!(layer = %id, "layer group created");
                Ok(id)
            }
        }
    }

    /// Group dialog "Delete": drop the open layer and its geometry.
    pub fn delete_group(&mut self) -> Result<String, EditorError> {
        let id = self.selected_id()?;
        self.scene.clear_editable();
        if let Some(layer) = self.layer_index.remove(&id) {
            for handle in layer.handles() {
                self.scene.remove_path(handle);
            }
        }
        self.layer_order.retain(|l| *l != id);
        self.close_pane();
        tracing::info!(layer = %id, "layer group deleted");
        Ok(id)
    }

    /// Move a group to `index` in group order (clamped).
    pub fn move_layer(&mut self, layer_id: &str, index: usize) -> Result<(), EditorError> {
        let pos = self
            .layer_order
            .iter()
            .position(|id| id == layer_id)
            .ok_or_else(|| EditorError::UnknownLayer(layer_id.to_string()))?;
        let id = self.layer_order.remove(pos);
        let index = index.min(self.layer_order.len());
        self.layer_order.insert(index, id);
        Ok(())
    }

    pub fn move_feature(&mut self, layer_id: &str, feature_id: &str, index: usize) -> Result<(), EditorError> {
        let layer = self
            .layer_index
            .get_mut(layer_id)
            .ok_or_else(|| EditorError::UnknownLayer(layer_id.to_string()))?;
        if layer.move_feature(feature_id, index) {
            Ok(())
        } else {
            Err(EditorError::UnknownFeature(feature_id.to_string()))
        }
    }

    /// Vertex edit on a feature of the open layer.
    pub fn edit_geometry(&mut self, feature_id: &str, geometry: LineGeometry) -> Result<(), EditorError> {
        let handle = self
            .selected_layer()
            .ok_or(EditorError::NoLayerSelected)?
            .feature(feature_id)
            .map(|f| f.handle)
            .ok_or_else(|| EditorError::UnknownFeature(feature_id.to_string()))?;

        if !self.scene.is_editable(handle) || !self.scene.set_geometry(handle, geometry) {
            return Err(EditorError::UnknownFeature(feature_id.to_string()));
        }
        Ok(())
    }

    /// `(layer id, feature id)` of features drawn when the viewer loads.
    pub fn startup_visible_features(&self) -> Vec<(String, String)> {
        self.layers()
            .filter(|layer| layer.startup_show)
            .flat_map(|layer| {
                layer
                    .features()
                    .filter(|f| f.properties.initial_show)
                    .map(|f| (layer.id.clone(), f.properties.feature_id.clone()))
            })
            .collect()
    }

    /// Rebuild the persisted document in group order, then feature order.
    /// Any inconsistency aborts the whole export.
    pub fn export(&self) -> Result<ProjectConfig, ExportError> {
        let mut config = self.config.clone();
        config.layers = self
            .layer_order
            .iter()
            .map(|id| {
                self.layer_index
                    .get(id)
                    .ok_or_else(|| ExportError::MissingLayer(id.clone()))?
                    .to_config(&self.scene)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(config)
    }

    /// Accordion panes for every group.
    pub fn editor_markup(&self) -> String {
        self.layers().map(FeatureLayer::editor_markup).collect()
    }

    /// Legend entries for every group.
    pub fn legend_markup(&self) -> String {
        self.layers().map(FeatureLayer::legend_markup).collect()
    }
}
