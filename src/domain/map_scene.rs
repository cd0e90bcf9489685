// Map scene - the rendering-side state the editor drives
use super::bounds::LatLng;
use super::feature::{LineGeometry, PathStyle};
use std::collections::HashMap;

/// Opaque reference to a path owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawControl {
    Polyline,
    Rectangle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPath {
    pub geometry: LineGeometry,
    pub style: PathStyle,
    pub popup: Option<String>,
}

/// Paths, the editable set, the project-center marker, the active draw control
/// and the bounds shade. Features refer to paths by handle only.
#[derive(Debug, Default)]
pub struct MapScene {
    next_handle: u64,
    paths: HashMap<GeometryHandle, RenderedPath>,
    editable: Vec<GeometryHandle>,
    marker_position: Option<LatLng>,
    marker_visible: bool,
    draw_control: Option<DrawControl>,
    shade: Vec<Vec<[f64; 2]>>,
}

impl MapScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, geometry: LineGeometry, style: PathStyle, popup: Option<String>) -> GeometryHandle {
        self.next_handle += 1;
        let handle = GeometryHandle(self.next_handle);
        self.paths.insert(handle, RenderedPath { geometry, style, popup });
        handle
    }

    /// Drop a path from the scene, including the editable set.
    pub fn remove_path(&mut self, handle: GeometryHandle) -> Option<RenderedPath> {
        self.editable.retain(|h| *h != handle);
        self.paths.remove(&handle)
    }

    /// Replace style and popup. Returns false for unknown handles.
    pub fn restyle(&mut self, handle: GeometryHandle, style: PathStyle, popup: Option<String>) -> bool {
        match self.paths.get_mut(&handle) {
            Some(path) => {
                path.style = style;
                path.popup = popup;
                true
            }
            None => false,
        }
    }

    pub fn path(&self, handle: GeometryHandle) -> Option<&RenderedPath> {
        self.paths.get(&handle)
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<&LineGeometry> {
        self.paths.get(&handle).map(|p| &p.geometry)
    }

    /// Vertex edits made with the edit toolbar land here.
    pub fn set_geometry(&mut self, handle: GeometryHandle, geometry: LineGeometry) -> bool {
        match self.paths.get_mut(&handle) {
            Some(path) => {
                path.geometry = geometry;
                true
            }
            None => false,
        }
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn add_editable(&mut self, handle: GeometryHandle) {
        if !self.editable.contains(&handle) {
            self.editable.push(handle);
        }
    }

    pub fn remove_editable(&mut self, handle: GeometryHandle) {
        self.editable.retain(|h| *h != handle);
    }

    pub fn clear_editable(&mut self) {
        self.editable.clear();
    }

    pub fn editable(&self) -> &[GeometryHandle] {
        &self.editable
    }

    pub fn is_editable(&self, handle: GeometryHandle) -> bool {
        self.editable.contains(&handle)
    }

    pub fn set_marker_position(&mut self, position: LatLng) {
        self.marker_position = Some(position);
    }

    pub fn marker_position(&self) -> Option<LatLng> {
        self.marker_position
    }

    pub fn set_marker_visible(&mut self, visible: bool) {
        self.marker_visible = visible;
    }

    pub fn marker_visible(&self) -> bool {
        self.marker_visible
    }

    pub fn set_draw_control(&mut self, control: Option<DrawControl>) {
        self.draw_control = control;
    }

    pub fn draw_control(&self) -> Option<DrawControl> {
        self.draw_control
    }

    pub fn set_shade(&mut self, rings: Vec<Vec<[f64; 2]>>) {
        self.shade = rings;
    }

    pub fn shade(&self) -> &[Vec<[f64; 2]>] {
        &self.shade
    }
}
