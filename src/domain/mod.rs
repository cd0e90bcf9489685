// Domain layer - project, layer and feature models
pub mod bounds;
pub mod feature;
pub mod feature_layer;
pub mod inventory;
pub mod map_scene;
pub mod markup;
pub mod project_config;
pub mod winter_roads;

#[cfg(test)]
pub mod fixtures;
