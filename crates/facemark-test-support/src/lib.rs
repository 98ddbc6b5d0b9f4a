//! Test support utilities for facemark.
//!
//! Provides mocks for every port of the annotation pipeline plus synthetic
//! image builders. Mocks share their state between clones, so a test can hand
//! one clone to the pipeline and assert on the other.
//!
//! # Example
//!
//! ```
//! use facemark_core::{AnnotationPipeline, RetryPolicy};
//! use facemark_test_support::{
//!     MockDetectorFactory, MockImageSource, MockNotifier, SyntheticImageBuilder,
//! };
//!
//! let source = MockImageSource::new()
//!     .with_image("photo", SyntheticImageBuilder::uniform_rgb(32, 24, [10, 20, 30]));
//! let detectors = MockDetectorFactory::operational();
//!
//! let pipeline = AnnotationPipeline::new(
//!     Box::new(source),
//!     Box::new(detectors.clone()),
//!     Box::new(MockNotifier::new()),
//! )
//! .with_retry(RetryPolicy::new(2, std::time::Duration::ZERO));
//!
//! let canvas = pipeline.run("photo").unwrap();
//! assert_eq!(canvas.dimensions(), (32, 24));
//! assert_eq!(detectors.release_count(), 1);
//! ```

mod builders;
mod mocks;
mod weights;

pub use builders::SyntheticImageBuilder;
pub use mocks::{
    MockDetector, MockDetectorFactory, MockImageSource, MockNotifier, MockPresenter,
    MockProgressSink,
};
pub use weights::write_blank_blazeface;
