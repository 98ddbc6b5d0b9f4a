//! Detected faces and their landmark points.

use serde::{Deserialize, Serialize};

/// Axis-aligned face region in source-image pixel coordinates.
///
/// The box may extend past the image edges; drawing clips it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl BoundingBox {
    /// Creates a bounding box from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`).
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Anatomical point reported for a face.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkKind {
    /// Center of the subject's left eye.
    LeftEye,
    /// Center of the subject's right eye.
    RightEye,
    /// Base of the nose.
    NoseBase,
    /// Center of the mouth.
    Mouth,
    /// Left corner of the mouth.
    LeftMouth,
    /// Right corner of the mouth.
    RightMouth,
    /// Left cheek.
    LeftCheek,
    /// Right cheek.
    RightCheek,
    /// Left ear (tragion).
    LeftEar,
    /// Right ear (tragion).
    RightEar,
}

/// A named point on a face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Which point this is.
    pub kind: LandmarkKind,
    /// Horizontal position in source pixels.
    pub x: f32,
    /// Vertical position in source pixels.
    pub y: f32,
}

impl Landmark {
    /// Creates a landmark.
    #[must_use]
    pub const fn new(kind: LandmarkKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }

    /// Integer pixel center used for drawing, truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// One detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Face region.
    pub bbox: BoundingBox,
    /// Landmark points, in detector order.
    pub landmarks: Vec<Landmark>,
    /// Detector confidence (0.0 to 1.0).
    pub confidence: f32,
}

impl Detection {
    /// Creates a detection without landmarks and full confidence.
    #[must_use]
    pub const fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            landmarks: Vec::new(),
            confidence: 1.0,
        }
    }

    /// Adds a landmark.
    #[must_use]
    pub fn with_landmark(mut self, landmark: Landmark) -> Self {
        self.landmarks.push(landmark);
        self
    }

    /// Sets the confidence score.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}
