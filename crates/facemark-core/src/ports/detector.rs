//! Face detector port.

use image::DynamicImage;

use crate::domain::Detection;

/// Which landmarks the detector should report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LandmarkMode {
    /// No landmarks, bounding boxes only.
    None,
    /// Every landmark the backend can locate.
    #[default]
    All,
}

/// Construction options for a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorOptions {
    /// Track face identity across frames.
    pub tracking: bool,
    /// Requested landmark set.
    pub landmarks: LandmarkMode,
}

impl DetectorOptions {
    /// Options for a single still image: no tracking, all landmarks.
    #[must_use]
    pub const fn still_image() -> Self {
        Self {
            tracking: false,
            landmarks: LandmarkMode::All,
        }
    }
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self::still_image()
    }
}

/// A face detection backend.
///
/// Implementations may need time to become usable (e.g. while model weights
/// are fetched), which is reported through [`FaceDetector::check_operational`].
pub trait FaceDetector: Send {
    /// Whether the detector can currently run.
    fn check_operational(&self) -> bool;

    /// Detects faces in `image`. Zero faces is a valid result.
    ///
    /// Must not modify the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails during inference.
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<Detection>>;

    /// Frees backend resources. Called exactly once per detector.
    fn release(&mut self);
}

/// Builds a fresh detector for each annotation run.
pub trait DetectorFactory: Send + Sync {
    /// Constructs a detector with the given options.
    fn create(&self, options: &DetectorOptions) -> Box<dyn FaceDetector>;
}
