use crate::geojson::Feature;
use crate::output::OutputKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload of one requested output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Artifact {
    /// Base64 of a PNG (raw raster or rendered plot).
    Encoded(String),
    /// Structured GeoJSON features.
    Features(Vec<Feature>),
}

impl Artifact {
    pub fn as_encoded(&self) -> Option<&str> {
        match self {
            Artifact::Encoded(data) => Some(data),
            Artifact::Features(_) => None,
        }
    }

    pub fn as_features(&self) -> Option<&[Feature]> {
        match self {
            Artifact::Features(features) => Some(features),
            Artifact::Encoded(_) => None,
        }
    }
}

/// Complete set of artifacts for one request, keyed by kind.
pub type ArtifactSet = BTreeMap<OutputKind, Artifact>;
