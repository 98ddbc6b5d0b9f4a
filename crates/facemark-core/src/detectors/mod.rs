//! Face detector backends.

mod blazeface;

pub use blazeface::{BlazeFaceDetector, BlazeFaceFactory, DEFAULT_MIN_CONFIDENCE};
