//! Overlay rendering: copies the source into a draw-format canvas and strokes
//! face boxes and landmark markers on top.
//!
//! Rendering is a stateless transform. All shapes use one color, so drawing
//! order never changes the resulting pixels.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use tracing::trace;

use crate::domain::{quantize_rgb565, BoundingBox, Detection, RasterImage};

/// Cyan, the default overlay color.
pub const CYAN: Rgb<u8> = Rgb([0, 255, 255]);

/// Paint settings for face overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Stroke and marker color.
    pub color: Rgb<u8>,
    /// Bounding box stroke width, centered on the box edge.
    pub stroke_width: f32,
    /// Bounding box corner radius.
    pub corner_radius: f32,
    /// Landmark marker radius in pixels.
    pub landmark_radius: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: CYAN,
            stroke_width: 5.0,
            corner_radius: 2.0,
            landmark_radius: 10,
        }
    }
}

/// Allocates a draw-format canvas the size of `source` and blits it at (0, 0).
///
/// The source itself is left untouched.
#[must_use]
pub fn prepare_canvas(source: &DynamicImage) -> RasterImage {
    RasterImage::from_source(source)
}

/// Draws every detection onto `canvas` and returns it for chaining.
///
/// Shapes that fall partly or wholly outside the canvas are clipped.
pub fn draw_detections<'a>(
    canvas: &'a mut RasterImage,
    detections: &[Detection],
    style: &OverlayStyle,
) -> &'a mut RasterImage {
    let color = quantize_rgb565(style.color);
    let buffer = canvas.buffer_mut();

    for detection in detections {
        trace!(
            "Drawing face at {:?} with {} landmarks",
            detection.bbox,
            detection.landmarks.len()
        );
        stroke_rounded_rect(
            buffer,
            &detection.bbox,
            style.corner_radius,
            style.stroke_width,
            color,
        );
        for landmark in &detection.landmarks {
            let center = landmark.pixel();
            if marker_visible(center, style.landmark_radius, buffer.dimensions()) {
                draw_filled_circle_mut(buffer, center, style.landmark_radius, color);
            }
        }
    }

    canvas
}

/// Strokes the outline of a rounded rectangle.
///
/// A pixel is painted when its center lies within `stroke_width / 2` of the
/// outline (half-open, so a 5 px stroke covers exactly 5 pixels per edge).
#[allow(clippy::cast_precision_loss)]
fn stroke_rounded_rect(
    buffer: &mut RgbImage,
    bbox: &BoundingBox,
    corner_radius: f32,
    stroke_width: f32,
    color: Rgb<u8>,
) {
    let half = stroke_width.max(0.0) / 2.0;
    let (left, right) = ordered(bbox.x, bbox.right());
    let (top, bottom) = ordered(bbox.y, bbox.bottom());

    let reach = half + 1.0;
    let Some((x0, x1)) = pixel_span(left - reach, right + reach, buffer.width()) else {
        return;
    };
    let Some((y0, y1)) = pixel_span(top - reach, bottom + reach, buffer.height()) else {
        return;
    };

    let shape = RoundedRect::new(left, top, right, bottom, corner_radius);
    for py in y0..=y1 {
        for px in x0..=x1 {
            let d = shape.signed_distance(px as f32 + 0.5, py as f32 + 0.5);
            if -half < d && d <= half {
                buffer.put_pixel(px, py, color);
            }
        }
    }
}

/// Whether a marker of `radius` at `center` can touch the canvas.
///
/// Markers that cannot are skipped, which also keeps far-away centers from
/// overflowing the circle rasterizer.
fn marker_visible(center: (i32, i32), radius: i32, (width, height): (u32, u32)) -> bool {
    let (x, y) = (i64::from(center.0), i64::from(center.1));
    let r = i64::from(radius.max(0));
    x + r >= 0 && y + r >= 0 && x - r < i64::from(width) && y - r < i64::from(height)
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Inclusive pixel range covering `[lo, hi]`, clipped to `0..limit`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
fn pixel_span(lo: f32, hi: f32, limit: u32) -> Option<(u32, u32)> {
    if limit == 0 {
        return None;
    }
    let lo = (lo.floor() as i64).max(0);
    let hi = (hi.ceil() as i64).min(i64::from(limit) - 1);
    (lo <= hi).then_some((lo as u32, hi as u32))
}

/// Rounded rectangle in center/half-extent form.
struct RoundedRect {
    cx: f32,
    cy: f32,
    hx: f32,
    hy: f32,
    radius: f32,
}

impl RoundedRect {
    fn new(left: f32, top: f32, right: f32, bottom: f32, radius: f32) -> Self {
        let hx = (right - left) / 2.0;
        let hy = (bottom - top) / 2.0;
        Self {
            cx: left + hx,
            cy: top + hy,
            hx,
            hy,
            radius: radius.min(hx).min(hy).max(0.0),
        }
    }

    /// Distance from `(x, y)` to the outline; negative inside.
    fn signed_distance(&self, x: f32, y: f32) -> f32 {
        let qx = (x - self.cx).abs() - (self.hx - self.radius);
        let qy = (y - self.cy).abs() - (self.hy - self.radius);
        let outside = qx.max(0.0).hypot(qy.max(0.0));
        let inside = qx.max(qy).min(0.0);
        outside + inside - self.radius
    }
}
