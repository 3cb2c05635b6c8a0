//! Minimal GeoJSON feature model for instance polygons in pixel coordinates.

use serde::{Deserialize, Serialize};

/// Closed ring of `[x, y]` positions; first and last positions are equal.
pub type Ring = Vec<[f64; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    Feature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// Exterior ring followed by hole rings.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub label: u16,
    /// Polygon area in square pixels (holes subtracted).
    pub area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: FeatureProperties) -> Self {
        Self {
            kind: FeatureType::Feature,
            geometry,
            properties,
        }
    }

    pub fn label(&self) -> u16 {
        self.properties.label
    }
}
