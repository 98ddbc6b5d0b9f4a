//! Annotation pipeline: load, detect, draw.
//!
//! One run is synchronous and owns every resource it acquires. The detector
//! is constructed per run and released on every exit path through
//! [`DetectorHandle`].

mod handle;
mod retry;

pub use handle::DetectorHandle;
pub use retry::{ensure_operational, RetryPolicy};

use tracing::{debug, info};

use crate::domain::{Detection, RasterImage};
use crate::error::{PipelineError, DETECTOR_UNAVAILABLE_MESSAGE};
use crate::overlay::{draw_detections, prepare_canvas, OverlayStyle};
use crate::ports::{
    DetectorFactory, DetectorOptions, ImageSource, Notifier, PipelineEvent, ProgressSink,
};

/// Output of a successful run.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Annotated canvas, same size as the source.
    pub canvas: RasterImage,
    /// Faces drawn onto the canvas.
    pub detections: Vec<Detection>,
}

/// Orchestrates image source, detector and overlay renderer.
pub struct AnnotationPipeline {
    source: Box<dyn ImageSource>,
    detectors: Box<dyn DetectorFactory>,
    notifier: Box<dyn Notifier>,
    progress: Option<Box<dyn ProgressSink>>,
    retry: RetryPolicy,
    options: DetectorOptions,
    style: OverlayStyle,
}

impl AnnotationPipeline {
    /// Creates a pipeline with the default retry policy, still-image detector
    /// options and overlay style.
    #[must_use]
    pub fn new(
        source: Box<dyn ImageSource>,
        detectors: Box<dyn DetectorFactory>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            detectors,
            notifier,
            progress: None,
            retry: RetryPolicy::default(),
            options: DetectorOptions::still_image(),
            style: OverlayStyle::default(),
        }
    }

    /// Sets the detector availability policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the detector construction options.
    #[must_use]
    pub fn with_options(mut self, options: DetectorOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Annotates the image behind `reference`.
    ///
    /// # Errors
    ///
    /// See [`AnnotationPipeline::run_detailed`].
    pub fn run(&self, reference: &str) -> Result<RasterImage, PipelineError> {
        self.run_detailed(reference).map(|a| a.canvas)
    }

    /// Annotates the image behind `reference`, also returning the detections.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::SourceUnreadable`] / [`PipelineError::DecodeFailed`]
    ///   if loading fails; no detector is constructed.
    /// - [`PipelineError::DetectorUnavailable`] if the detector never becomes
    ///   operational; the notifier is told before returning.
    /// - [`PipelineError::DetectionFailed`] if the backend errors.
    pub fn run_detailed(&self, reference: &str) -> Result<Annotation, PipelineError> {
        let result = self.annotate(reference);
        if let Err(ref e) = result {
            self.emit(PipelineEvent::Failed { kind: e.kind() });
        }
        result
    }

    fn annotate(&self, reference: &str) -> Result<Annotation, PipelineError> {
        let source = self.source.load(reference)?;
        debug!("Loaded {reference}: {}x{}", source.width(), source.height());
        self.emit(PipelineEvent::SourceLoaded {
            reference: reference.to_string(),
            width: source.width(),
            height: source.height(),
        });

        let handle = DetectorHandle::new(self.detectors.create(&self.options));
        let attempts = match ensure_operational(handle.detector(), &self.retry) {
            Ok(attempts) => attempts,
            Err(e) => {
                self.notifier.notify(DETECTOR_UNAVAILABLE_MESSAGE);
                return Err(e);
            }
        };
        self.emit(PipelineEvent::DetectorReady { attempts });

        let mut canvas = prepare_canvas(&source);

        let detections = handle
            .detector()
            .detect(&source)
            .map_err(PipelineError::DetectionFailed)?;
        info!("Detected {} face(s) in {reference}", detections.len());
        self.emit(PipelineEvent::FacesDetected {
            count: detections.len(),
        });

        draw_detections(&mut canvas, &detections, &self.style);
        self.emit(PipelineEvent::Rendered);

        handle.release();

        Ok(Annotation { canvas, detections })
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(progress) = &self.progress {
            progress.on_event(event);
        }
    }
}
