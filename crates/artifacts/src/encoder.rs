use crate::error::EncodeError;
use crate::outlines::{ContourOutlines, OutlineExtractor};
use crate::overlay::{HueOverlay, OverlayRenderer};
use crate::plot::{PlotOptions, render_plot};
use crate::polygons::{ContourPolygons, PolygonConverter};
use crate::raster::{encode_image_png, encode_labels_png, to_base64};
use common::span;
use ndarray::{ArrayView2, ArrayView3};
use schema::{Artifact, ArtifactSet, OutputKind};

/// Arrays of one segmentation at a common spatial extent.
#[derive(Debug, Clone, Copy)]
pub struct EncodeInput<'a> {
    pub labels: ArrayView2<'a, u16>,
    pub flows: ArrayView3<'a, u8>,
    /// Display image with channel zeroing already applied.
    pub image: ArrayView3<'a, u8>,
}

impl EncodeInput<'_> {
    fn check_extent(&self) -> Result<(), EncodeError> {
        let extent = self.labels.dim();
        let flows = (self.flows.shape()[0], self.flows.shape()[1]);
        let image = (self.image.shape()[0], self.image.shape()[1]);
        if flows != extent || image != extent {
            return Err(EncodeError::Shape(format!(
                "mask {extent:?}, flows {flows:?} and image {image:?} differ"
            )));
        }
        Ok(())
    }
}

/// Builds the requested artifacts from a segmentation.
pub struct OutputEncoder {
    outlines: Box<dyn OutlineExtractor>,
    overlay: Box<dyn OverlayRenderer>,
    polygons: Box<dyn PolygonConverter>,
}

impl Default for OutputEncoder {
    fn default() -> Self {
        Self {
            outlines: Box::new(ContourOutlines),
            overlay: Box::new(HueOverlay),
            polygons: Box::new(ContourPolygons),
        }
    }
}

impl OutputEncoder {
    pub fn with_outline_extractor(mut self, extractor: impl OutlineExtractor + 'static) -> Self {
        self.outlines = Box::new(extractor);
        self
    }

    pub fn with_overlay_renderer(mut self, renderer: impl OverlayRenderer + 'static) -> Self {
        self.overlay = Box::new(renderer);
        self
    }

    pub fn with_polygon_converter(mut self, converter: impl PolygonConverter + 'static) -> Self {
        self.polygons = Box::new(converter);
        self
    }

    /// Produce one artifact per requested kind.
    ///
    /// All or nothing: the first failing kind aborts the whole set.
    pub fn encode(
        &self,
        input: &EncodeInput<'_>,
        kinds: &[OutputKind],
    ) -> Result<ArtifactSet, EncodeError> {
        let _s = span!("encode_outputs");
        input.check_extent()?;

        let mut artifacts = ArtifactSet::new();
        for &kind in kinds {
            let artifact = self
                .encode_kind(input, kind)
                .map_err(|source| EncodeError::Artifact {
                    kind,
                    source: Box::new(source),
                })?;
            artifacts.insert(kind, artifact);
        }
        Ok(artifacts)
    }

    fn encode_kind(&self, input: &EncodeInput<'_>, kind: OutputKind) -> Result<Artifact, EncodeError> {
        let plot = PlotOptions::default();
        let png = match kind {
            OutputKind::Mask => encode_labels_png(&input.labels)?,
            OutputKind::Flow => encode_image_png(&input.flows)?,
            OutputKind::Img => encode_image_png(&input.image)?,
            OutputKind::OutlinePlot => {
                let outlines = self.outlines.extract_outlines(&input.labels)?;
                render_plot(&input.image, &outlines, plot)?
            }
            OutputKind::OverlayPlot => {
                let overlay = self.overlay.render_overlay(&input.image, &input.labels)?;
                render_plot(&overlay.view(), &[], plot)?
            }
            OutputKind::FlowPlot => render_plot(&input.flows, &[], plot)?,
            OutputKind::ImgPlot => render_plot(&input.image, &[], plot)?,
            OutputKind::Geojson => {
                return Ok(Artifact::Features(self.polygons.to_polygons(&input.labels)?));
            }
        };
        Ok(Artifact::Encoded(to_base64(&png)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_mismatched_extents_are_rejected() {
        let labels = Array2::<u16>::zeros((4, 4));
        let flows = Array3::<u8>::zeros((4, 5, 3));
        let image = Array3::<u8>::zeros((4, 4, 1));
        let input = EncodeInput {
            labels: labels.view(),
            flows: flows.view(),
            image: image.view(),
        };

        let result = OutputEncoder::default().encode(&input, &[OutputKind::Mask]);
        assert!(matches!(result, Err(EncodeError::Shape(_))));
    }

    #[test]
    fn test_nothing_requested_gives_empty_set() {
        let labels = Array2::<u16>::zeros((2, 2));
        let flows = Array3::<u8>::zeros((2, 2, 3));
        let image = Array3::<u8>::zeros((2, 2, 3));
        let input = EncodeInput {
            labels: labels.view(),
            flows: flows.view(),
            image: image.view(),
        };

        let artifacts = OutputEncoder::default().encode(&input, &[]).unwrap();
        assert!(artifacts.is_empty());
    }
}
