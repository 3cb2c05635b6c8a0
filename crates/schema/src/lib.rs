//! Wire types shared by the segmentation service and its HTTP front end.

pub mod artifact;
pub mod geojson;
pub mod output;
pub mod request;
pub mod response;

pub use artifact::{Artifact, ArtifactSet};
pub use geojson::{Feature, FeatureProperties, Geometry, Ring};
pub use output::{OutputKind, parse_output_kinds};
pub use request::{SegmentForm, parse_flag};
pub use response::{SegmentFailure, SegmentResponse, SegmentSuccess};
