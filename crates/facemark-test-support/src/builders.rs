//! Synthetic image builders for testing.

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

/// Builder for creating synthetic source images.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a single-color RGB image.
    #[must_use]
    pub fn uniform_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    /// Creates a black and white checkerboard with `cell`-pixel squares.
    ///
    /// Both colors survive RGB565 quantization unchanged.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell: u32) -> DynamicImage {
        let cell = cell.max(1);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Creates a horizontal red ramp, useful for checking quantization loss.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, _| {
            let val = ((u32::from(u8::MAX) * x) / width.saturating_sub(1).max(1)) as u8;
            Rgb([val, 64, 128])
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Creates a single-color RGBA image.
    #[must_use]
    pub fn uniform_rgba(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    /// A mid-gray 64x48 image for tests that only care about plumbing.
    #[must_use]
    pub fn portrait() -> DynamicImage {
        Self::uniform_rgb(64, 48, [128, 128, 128])
    }
}
