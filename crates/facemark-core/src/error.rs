//! Failure taxonomy for an annotation run.

use thiserror::Error;

/// User-visible message for an unavailable detector.
pub const DETECTOR_UNAVAILABLE_MESSAGE: &str = "face detection unavailable on this device";

/// Terminal failure of an annotation run.
///
/// No variant is retried by the pipeline; the only retry in the system is the
/// detector availability recheck, and exhausting it yields
/// [`PipelineError::DetectorUnavailable`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The reference could not be opened or resolved.
    #[error("cannot open image source '{reference}'")]
    SourceUnreadable {
        /// The reference that failed to open.
        reference: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The bytes were readable but are not a decodable image.
    #[error("failed to decode image '{reference}'")]
    DecodeFailed {
        /// The reference whose bytes failed to decode.
        reference: String,
        /// Underlying codec failure.
        #[source]
        source: image::ImageError,
    },

    /// The detector never reported itself operational.
    #[error("face detection unavailable on this device (checked {attempts} times)")]
    DetectorUnavailable {
        /// Number of availability checks performed.
        attempts: u32,
    },

    /// The detector backend failed while running detection.
    #[error("face detection failed")]
    DetectionFailed(#[source] anyhow::Error),
}

impl PipelineError {
    /// Short machine-readable name of the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnreadable { .. } => "source_unreadable",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::DetectorUnavailable { .. } => "detector_unavailable",
            Self::DetectionFailed(_) => "detection_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message_is_user_facing() {
        let err = PipelineError::DetectorUnavailable { attempts: 2 };
        assert!(err.to_string().starts_with(DETECTOR_UNAVAILABLE_MESSAGE));
        assert_eq!(err.kind(), "detector_unavailable");
    }

    #[test]
    fn test_source_error_keeps_cause() {
        let err = PipelineError::SourceUnreadable {
            reference: "missing.jpg".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("missing.jpg"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
