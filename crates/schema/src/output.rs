use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named artifact a caller can request from a segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// 16-bit PNG of the label mask.
    Mask,
    /// PNG of the flow field.
    Flow,
    /// PNG of the display image.
    Img,
    OutlinePlot,
    OverlayPlot,
    FlowPlot,
    ImgPlot,
    /// GeoJSON features, embedded as JSON rather than base64.
    Geojson,
}

impl OutputKind {
    pub const ALL: [OutputKind; 8] = [
        OutputKind::Mask,
        OutputKind::Flow,
        OutputKind::Img,
        OutputKind::OutlinePlot,
        OutputKind::OverlayPlot,
        OutputKind::FlowPlot,
        OutputKind::ImgPlot,
        OutputKind::Geojson,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Mask => "mask",
            OutputKind::Flow => "flow",
            OutputKind::Img => "img",
            OutputKind::OutlinePlot => "outline_plot",
            OutputKind::OverlayPlot => "overlay_plot",
            OutputKind::FlowPlot => "flow_plot",
            OutputKind::ImgPlot => "img_plot",
            OutputKind::Geojson => "geojson",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// Parse the comma-delimited `outputs` field.
///
/// Unknown names are skipped and duplicates collapsed (first occurrence wins
/// the ordering). A missing or effectively empty list means `mask`.
pub fn parse_output_kinds(raw: Option<&str>) -> Vec<OutputKind> {
    let mut kinds = Vec::new();
    let mut named_any = false;
    for name in raw.unwrap_or_default().split(',').map(str::trim) {
        if name.is_empty() {
            continue;
        }
        named_any = true;
        match name.parse::<OutputKind>() {
            Ok(kind) if !kinds.contains(&kind) => kinds.push(kind),
            Ok(_) | Err(()) => {}
        }
    }

    if !named_any {
        kinds.push(OutputKind::Mask);
    }
    kinds
}
