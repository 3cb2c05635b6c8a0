//! Rasterized figures: an array drawn into a fixed-size canvas, optionally
//! with outlines and axes, encoded as PNG.

use crate::error::EncodeError;
use crate::outlines::Outline;
use common::span;
use ndarray::ArrayView3;
use tiny_skia::{
    Color, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

/// Longer side of every rendered figure, in pixels.
pub const PLOT_LONG_SIDE: u32 = 600;

/// Fraction of the figure left empty around the axes box on each side.
const AXES_MARGIN: f32 = 0.08;
const TICK_LENGTH: f32 = 4.0;
const TARGET_TICKS: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlotOptions {
    /// Draw a frame and tick marks around the array.
    pub axis_on: bool,
}

/// Render `image` (1 or 3 channels) with `outlines` stroked in red on top,
/// returning PNG bytes.
pub fn render_plot(
    image: &ArrayView3<u8>,
    outlines: &[Outline],
    options: PlotOptions,
) -> Result<Vec<u8>, EncodeError> {
    let _s = span!("render_plot");
    let (height, width, _) = image.dim();
    if height == 0 || width == 0 {
        return Err(EncodeError::Render(format!(
            "cannot plot an empty {height}x{width} array"
        )));
    }

    let mut canvas = Canvas::new(height, width)?;
    canvas.draw_array(image)?;
    canvas.draw_outlines(outlines);
    if options.axis_on {
        canvas.draw_axes();
    }
    canvas.encode()
}

/// Figure size for a `height` x `width` array: longer side fixed, aspect kept.
pub fn figure_size(height: usize, width: usize) -> (u32, u32) {
    let long = f64::from(PLOT_LONG_SIDE);
    let scaled = |side: usize, longest: usize| {
        ((side as f64 * long / longest as f64).round() as u32).max(1)
    };
    if width >= height {
        (PLOT_LONG_SIDE, scaled(height, width))
    } else {
        (scaled(width, height), PLOT_LONG_SIDE)
    }
}

/// Drawing surface for one figure. The pixmap lives exactly as long as the
/// canvas, so every exit path from [`render_plot`] releases it.
struct Canvas {
    pixmap: Pixmap,
    axes: Rect,
    /// Array extent as (rows, cols).
    extent: (usize, usize),
}

impl Canvas {
    fn new(height: usize, width: usize) -> Result<Self, EncodeError> {
        let (fig_width, fig_height) = figure_size(height, width);
        let mut pixmap = Pixmap::new(fig_width, fig_height).ok_or_else(|| {
            EncodeError::Render(format!("invalid canvas size {fig_width}x{fig_height}"))
        })?;
        pixmap.fill(Color::BLACK);

        let (fw, fh) = (fig_width as f32, fig_height as f32);
        let axes = Rect::from_xywh(
            fw * AXES_MARGIN,
            fh * AXES_MARGIN,
            fw * (1.0 - 2.0 * AXES_MARGIN),
            fh * (1.0 - 2.0 * AXES_MARGIN),
        )
        .ok_or_else(|| EncodeError::Render("degenerate axes box".to_string()))?;

        Ok(Self {
            pixmap,
            axes,
            extent: (height, width),
        })
    }

    fn scale(&self) -> (f32, f32) {
        (
            self.axes.width() / self.extent.1 as f32,
            self.axes.height() / self.extent.0 as f32,
        )
    }

    /// Array pixel centre to canvas coordinates.
    fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        let (sx, sy) = self.scale();
        (
            self.axes.left() + (x + 0.5) * sx,
            self.axes.top() + (y + 0.5) * sy,
        )
    }

    fn draw_array(&mut self, image: &ArrayView3<u8>) -> Result<(), EncodeError> {
        let (height, width, channels) = image.dim();
        if channels != 1 && channels != 3 {
            return Err(EncodeError::Render(format!(
                "cannot plot {channels} channels"
            )));
        }

        let mut source = Pixmap::new(width as u32, height as u32)
            .ok_or_else(|| EncodeError::Render(format!("invalid array size {height}x{width}")))?;
        for (index, pixel) in source.data_mut().chunks_exact_mut(4).enumerate() {
            let (row, col) = (index / width, index % width);
            let rgb = if channels == 1 {
                let v = image[[row, col, 0]];
                [v, v, v]
            } else {
                [image[[row, col, 0]], image[[row, col, 1]], image[[row, col, 2]]]
            };
            pixel.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }

        let (sx, sy) = self.scale();
        let paint = PixmapPaint {
            quality: FilterQuality::Nearest,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            Transform::from_row(sx, 0.0, 0.0, sy, self.axes.left(), self.axes.top()),
            None,
        );
        Ok(())
    }

    fn draw_outlines(&mut self, outlines: &[Outline]) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 0, 0, 255);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };

        for outline in outlines {
            let mut pb = PathBuilder::new();
            let mut points = outline.iter().map(|&[x, y]| self.to_canvas(x, y));
            let Some((x, y)) = points.next() else {
                continue;
            };
            pb.move_to(x, y);
            for (x, y) in points {
                pb.line_to(x, y);
            }
            pb.close();
            // Single-point outlines yield no path.
            if let Some(path) = pb.finish() {
                self.pixmap
                    .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }

    fn draw_axes(&mut self) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 255, 255, 255);
        paint.anti_alias = false;
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };

        let frame = PathBuilder::from_rect(self.axes);
        self.pixmap
            .stroke_path(&frame, &paint, &stroke, Transform::identity(), None);

        let (rows, cols) = self.extent;
        let (sx, sy) = self.scale();
        let (left, top, bottom) = (self.axes.left(), self.axes.top(), self.axes.bottom());

        let mut pb = PathBuilder::new();
        let col_step = tick_step(cols);
        for col in (0..=cols).step_by(col_step) {
            let x = left + col as f32 * sx;
            pb.move_to(x, bottom);
            pb.line_to(x, bottom + TICK_LENGTH);
        }
        let row_step = tick_step(rows);
        for row in (0..=rows).step_by(row_step) {
            let y = top + row as f32 * sy;
            pb.move_to(left, y);
            pb.line_to(left - TICK_LENGTH, y);
        }
        if let Some(ticks) = pb.finish() {
            self.pixmap
                .stroke_path(&ticks, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn encode(self) -> Result<Vec<u8>, EncodeError> {
        self.pixmap
            .encode_png()
            .map_err(|e| EncodeError::Render(e.to_string()))
    }
}

/// Round tick spacing (1, 2 or 5 times a power of ten) giving about
/// five ticks over `extent`.
fn tick_step(extent: usize) -> usize {
    let raw = extent as f64 / TARGET_TICKS;
    if raw <= 1.0 {
        return 1;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|&candidate| candidate >= raw)
        .unwrap_or(10.0 * magnitude);
    step.round() as usize
}
