//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the annotation core and external adapters.

mod detector;
mod image_source;
mod notifier;
mod presenter;
mod progress;

pub use detector::{DetectorFactory, DetectorOptions, FaceDetector, LandmarkMode};
pub use image_source::ImageSource;
pub use notifier::Notifier;
pub use presenter::Presenter;
pub use progress::{PipelineEvent, ProgressSink};
