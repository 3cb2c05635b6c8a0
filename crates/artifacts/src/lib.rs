//! Output assembly for segmentation results.
//!
//! Turns a label mask, a flow field and a display image into the artifacts a
//! caller asked for: raw PNG rasters, rendered plots and GeoJSON polygons.
//! Outline extraction, overlay colouring and polygon conversion sit behind
//! traits so other algorithms can be swapped in.

pub mod encoder;
pub mod error;
mod labels;
pub mod outlines;
pub mod overlay;
pub mod plot;
pub mod polygons;
pub mod raster;

pub use encoder::{EncodeInput, OutputEncoder};
pub use error::EncodeError;
pub use outlines::{ContourOutlines, Outline, OutlineExtractor};
pub use overlay::{HueOverlay, OverlayRenderer};
pub use plot::{PLOT_LONG_SIDE, PlotOptions, render_plot};
pub use polygons::{ContourPolygons, PolygonConverter};
pub use raster::{decode_labels_png, encode_image_png, encode_labels_png, to_base64};
