use crate::error::EncodeError;
use crate::labels::{LabelRegion, label_regions};
use geo::{Area, LineString, Polygon, Rect, coord};
use imageproc::contours::{BorderType, Contour, find_contours};
use ndarray::ArrayView2;
use schema::{Feature, FeatureProperties, Geometry, Ring};

/// Converts a label mask into GeoJSON features, one per instance label.
pub trait PolygonConverter: Send + Sync {
    fn to_polygons(&self, labels: &ArrayView2<u16>) -> Result<Vec<Feature>, EncodeError>;
}

/// Contour-traced polygons in pixel coordinates.
///
/// Each outer border becomes a polygon exterior and the hole borders nested
/// directly in it become its interiors. Instances with several disconnected
/// parts come out as a `MultiPolygon`. Instances too thin to enclose any area
/// (single pixels, one-pixel lines) fall back to their pixel bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourPolygons;

impl PolygonConverter for ContourPolygons {
    fn to_polygons(&self, labels: &ArrayView2<u16>) -> Result<Vec<Feature>, EncodeError> {
        let features: Vec<Feature> = label_regions(labels)
            .iter()
            .map(|region| region_feature(region, labels))
            .collect::<Result<_, _>>()?;
        tracing::trace!(count = features.len(), "Converted instances to polygons");
        Ok(features)
    }
}

fn region_feature(region: &LabelRegion, labels: &ArrayView2<u16>) -> Result<Feature, EncodeError> {
    let (dx, dy) = region.origin();
    let contours: Vec<Contour<u32>> = find_contours(&region.crop(labels));

    let ring = |contour: &Contour<u32>| -> LineString<f64> {
        contour
            .points
            .iter()
            .map(|p| (f64::from(p.x) + dx, f64::from(p.y) + dy))
            .collect::<Vec<_>>()
            .into()
    };

    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    for (index, contour) in contours.iter().enumerate() {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        let holes = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Hole && c.parent == Some(index))
            .map(ring)
            .collect();
        let polygon = Polygon::new(ring(contour), holes);
        if polygon.unsigned_area() > 0.0 {
            polygons.push(polygon);
        }
    }

    if polygons.is_empty() {
        polygons.push(bounding_box(region));
    }

    let area: f64 = polygons.iter().map(|polygon| polygon.unsigned_area()).sum();
    if !area.is_finite() {
        return Err(EncodeError::Polygon(format!(
            "label {} has non-finite area",
            region.label
        )));
    }

    let geometry = match polygons.as_slice() {
        [single] => Geometry::Polygon(polygon_rings(single)),
        parts => Geometry::MultiPolygon(parts.iter().map(polygon_rings).collect()),
    };

    Ok(Feature::new(
        geometry,
        FeatureProperties {
            label: region.label,
            area,
        },
    ))
}

/// Box around the region's pixel centres, grown by half a pixel.
fn bounding_box(region: &LabelRegion) -> Polygon<f64> {
    Rect::new(
        coord! { x: region.min_col as f64 - 0.5, y: region.min_row as f64 - 0.5 },
        coord! { x: region.max_col as f64 + 0.5, y: region.max_row as f64 + 0.5 },
    )
    .to_polygon()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Ring> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|line| line.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}
