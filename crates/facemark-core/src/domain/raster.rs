//! Draw-format raster buffer.
//!
//! Annotated output is drawn into an RGB565 buffer (5 bits red, 6 bits green,
//! 5 bits blue, no alpha). The buffer stores expanded 8-bit RGB so the
//! `image`/`imageproc` primitives can draw into it, but every stored pixel is
//! exactly representable in RGB565.

use image::{DynamicImage, Rgb, RgbImage};

/// Pixel layout of a [`RasterImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16-bit RGB, no alpha.
    Rgb565,
}

/// Annotation canvas in the draw pixel format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    buffer: RgbImage,
}

impl RasterImage {
    /// Allocates a black canvas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: RgbImage::new(width, height),
        }
    }

    /// Allocates a canvas of the same size as `source` and blits it at (0, 0).
    ///
    /// Alpha is composited over black, then each channel is reduced to RGB565.
    #[must_use]
    pub fn from_source(source: &DynamicImage) -> Self {
        let rgba = source.to_rgba8();
        let buffer = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            quantize_rgb565(Rgb([over_black(r, a), over_black(g, a), over_black(b, a)]))
        });
        Self { buffer }
    }

    /// Canvas width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Canvas height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Pixel format of the canvas.
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        PixelFormat::Rgb565
    }

    /// Pixel at `(x, y)`, expanded to 8 bits per channel.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.buffer.get_pixel(x, y)
    }

    /// Borrow the expanded RGB buffer.
    #[must_use]
    pub const fn as_rgb(&self) -> &RgbImage {
        &self.buffer
    }

    /// Mutable access for drawing primitives.
    ///
    /// Callers must only write RGB565-representable colors.
    pub(crate) fn buffer_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    /// Consume into a `DynamicImage` for encoding or display.
    #[must_use]
    pub fn into_dynamic(self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.buffer)
    }

    /// Packed RGB565 words in row-major order.
    #[must_use]
    pub fn to_rgb565(&self) -> Vec<u16> {
        self.buffer.pixels().map(|p| pack_rgb565(*p)).collect()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn over_black(channel: u8, alpha: u8) -> u8 {
    ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8
}

/// Packs an 8-bit RGB color into RGB565, dropping low bits.
#[must_use]
pub fn pack_rgb565(color: Rgb<u8>) -> u16 {
    let [r, g, b] = color.0;
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}

/// Expands an RGB565 word to 8 bits per channel by bit replication.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn unpack_rgb565(word: u16) -> Rgb<u8> {
    let r = ((word >> 11) & 0x1f) as u8;
    let g = ((word >> 5) & 0x3f) as u8;
    let b = (word & 0x1f) as u8;
    Rgb([(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)])
}

/// Nearest RGB565-representable color, expanded back to 8 bits.
#[must_use]
pub fn quantize_rgb565(color: Rgb<u8>) -> Rgb<u8> {
    unpack_rgb565(pack_rgb565(color))
}
