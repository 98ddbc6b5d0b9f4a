//! Facemark Core - face annotation pipeline
//!
//! Loads an image through an [`ImageSource`], runs a [`FaceDetector`] over it
//! and draws every face (a rounded rectangle plus filled landmark markers)
//! onto an RGB565 copy of the source. The `BlazeFace` backend lives in
//! [`detectors`]; filesystem and network adapters live in other crates.

pub mod detectors;
pub mod domain;
pub mod error;
pub mod inference;
pub mod overlay;
pub mod pipeline;
pub mod ports;

pub use domain::{BoundingBox, Detection, Landmark, LandmarkKind, PixelFormat, RasterImage};
pub use error::PipelineError;
pub use pipeline::{Annotation, AnnotationPipeline, RetryPolicy};
pub use ports::{
    DetectorFactory, DetectorOptions, FaceDetector, ImageSource, LandmarkMode, Notifier,
    PipelineEvent, Presenter, ProgressSink,
};
