//! Progress reporting port for UI integration.

/// Stage events emitted during an annotation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The source image was decoded.
    SourceLoaded {
        /// The reference that was loaded.
        reference: String,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// The detector reported itself operational.
    DetectorReady {
        /// Availability checks used (1 if no recheck was needed).
        attempts: u32,
    },
    /// Detection finished.
    FacesDetected {
        /// Number of faces found.
        count: usize,
    },
    /// Overlays were drawn onto the canvas.
    Rendered,
    /// The run failed.
    Failed {
        /// Failure kind, see [`crate::PipelineError::kind`].
        kind: &'static str,
    },
}

/// Port for receiving pipeline events.
pub trait ProgressSink: Send + Sync {
    /// Called when a stage completes.
    fn on_event(&self, event: PipelineEvent);
}
