//! [`FaceDetector`] backed by the `BlazeFace` network.
//!
//! The network is loaded lazily on the first operational check. A failed load
//! is not cached, so a later check can succeed once the weights appear on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::Device;
use image::DynamicImage;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::domain::Detection;
use crate::inference::{load_weights, select_device, BlazeFace};
use crate::ports::{DetectorFactory, DetectorOptions, FaceDetector, LandmarkMode};

/// Minimum face score kept by default.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.75;

/// A `BlazeFace` detector for one annotation run.
pub struct BlazeFaceDetector {
    weights: PathBuf,
    options: DetectorOptions,
    min_confidence: f32,
    device: Device,
    model: OnceCell<BlazeFace>,
}

impl BlazeFaceDetector {
    /// Creates a detector reading weights from `weights`. Nothing is loaded yet.
    #[must_use]
    pub fn new(weights: impl AsRef<Path>, options: DetectorOptions) -> Self {
        if options.tracking {
            debug!("BlazeFace has no tracking support, treating frames independently");
        }
        Self {
            weights: weights.as_ref().to_path_buf(),
            options,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            device: select_device(),
            model: OnceCell::new(),
        }
    }

    /// Sets the minimum score a face needs to be reported.
    #[must_use]
    pub const fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Whether the network is currently resident.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    fn model(&self) -> Result<&BlazeFace> {
        self.model.get_or_try_init(|| {
            debug!("Loading BlazeFace from {}", self.weights.display());
            let vb = load_weights(&self.weights, &self.device)
                .context("Failed to load BlazeFace weights")?;
            BlazeFace::new(vb).context("Failed to create BlazeFace model")
        })
    }
}

impl FaceDetector for BlazeFaceDetector {
    fn check_operational(&self) -> bool {
        match self.model() {
            Ok(_) => true,
            Err(e) => {
                warn!("BlazeFace not operational: {e:#}");
                false
            }
        }
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let model = self.model()?;
        let faces = model
            .detect(image, self.min_confidence)
            .context("BlazeFace inference failed")?;

        let with_landmarks = self.options.landmarks == LandmarkMode::All;
        Ok(faces
            .iter()
            .map(|face| face.to_detection(image.width(), image.height(), with_landmarks))
            .collect())
    }

    fn release(&mut self) {
        if self.model.take().is_some() {
            debug!("Released BlazeFace model");
        }
    }
}

/// Builds [`BlazeFaceDetector`]s sharing one weights path.
#[derive(Debug, Clone)]
pub struct BlazeFaceFactory {
    weights: PathBuf,
    min_confidence: f32,
}

impl BlazeFaceFactory {
    /// Creates a factory for weights at `weights`.
    #[must_use]
    pub fn new(weights: impl AsRef<Path>) -> Self {
        Self {
            weights: weights.as_ref().to_path_buf(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Sets the minimum face score for created detectors.
    #[must_use]
    pub const fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Path the created detectors load from.
    #[must_use]
    pub fn weights(&self) -> &Path {
        &self.weights
    }
}

impl DetectorFactory for BlazeFaceFactory {
    fn create(&self, options: &DetectorOptions) -> Box<dyn FaceDetector> {
        Box::new(
            BlazeFaceDetector::new(&self.weights, *options)
                .with_min_confidence(self.min_confidence),
        )
    }
}
