// Project bounds domain model
use serde::{Deserialize, Serialize};

/// Rectangular project area in degrees. Expected to satisfy
/// `south < north` and `west < east`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Geographic point, serialized the way the project configuration stores the
/// project center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl Bounds {
    /// Build bounds from two opposite corners in any order.
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south: a.lat.min(b.lat),
            west: a.lng.min(b.lng),
            north: a.lat.max(b.lat),
            east: a.lng.max(b.lng),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.south < self.north && self.west < self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south + self.north) / 2.0,
            lng: (self.west + self.east) / 2.0,
        }
    }

    /// Inner project ring as `[lng, lat]` positions, closed.
    pub fn ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.west, self.south],
            [self.west, self.north],
            [self.east, self.north],
            [self.east, self.south],
            [self.west, self.south],
        ]
    }

    /// World-covering ring with the project area cut out. Rendered as the grey
    /// shade around the project.
    pub fn shade_rings(&self) -> Vec<Vec<[f64; 2]>> {
        let world = vec![
            [-180.0, -90.0],
            [-180.0, 90.0],
            [180.0, 90.0],
            [180.0, -90.0],
            [-180.0, -90.0],
        ];
        vec![world, self.ring()]
    }

    /// Query window parameters understood by the inventory API.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("L", self.west.to_string()),
            ("R", self.east.to_string()),
            ("B", self.south.to_string()),
            ("T", self.north.to_string()),
        ]
    }
}
