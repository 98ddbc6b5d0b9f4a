//! Core domain types for face annotation.

mod detection;
mod raster;

pub use detection::{BoundingBox, Detection, Landmark, LandmarkKind};
pub use raster::{pack_rgb565, quantize_rgb565, unpack_rgb565, PixelFormat, RasterImage};
