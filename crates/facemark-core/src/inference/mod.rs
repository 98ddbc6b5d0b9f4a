//! ML inference using Candle.
//!
//! Hosts the `BlazeFace` network and the plumbing to load it.

mod blazeface;
mod device;
mod loader;

pub use blazeface::{BlazeFace, RawFace, INPUT_SIZE, KEYPOINT_KINDS};
pub use device::select_device;
pub use loader::load_weights;
