//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use facemark_core::domain::{Detection, RasterImage};
use facemark_core::error::PipelineError;
use facemark_core::ports::{
    DetectorFactory, DetectorOptions, FaceDetector, ImageSource, Notifier, PipelineEvent,
    Presenter, ProgressSink,
};
use image::error::{DecodingError, ImageFormatHint};
use image::{DynamicImage, ImageError};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
enum SourceEntry {
    Image(DynamicImage),
    Unreadable,
    Undecodable,
}

/// Mock implementation of `ImageSource`.
///
/// Unknown references are reported as unreadable.
#[derive(Clone, Default)]
pub struct MockImageSource {
    entries: HashMap<String, SourceEntry>,
    loads: Arc<Mutex<Vec<String>>>,
}

impl MockImageSource {
    /// Creates a source with no entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `image` for `reference`.
    #[must_use]
    pub fn with_image(mut self, reference: &str, image: DynamicImage) -> Self {
        self.entries
            .insert(reference.to_string(), SourceEntry::Image(image));
        self
    }

    /// Makes `reference` fail to open.
    #[must_use]
    pub fn with_unreadable(mut self, reference: &str) -> Self {
        self.entries
            .insert(reference.to_string(), SourceEntry::Unreadable);
        self
    }

    /// Makes `reference` open but fail to decode.
    #[must_use]
    pub fn with_undecodable(mut self, reference: &str) -> Self {
        self.entries
            .insert(reference.to_string(), SourceEntry::Undecodable);
        self
    }

    /// References passed to `load`, in call order.
    #[must_use]
    pub fn loads(&self) -> Vec<String> {
        lock(&self.loads).clone()
    }
}

impl ImageSource for MockImageSource {
    fn load(&self, reference: &str) -> Result<DynamicImage, PipelineError> {
        lock(&self.loads).push(reference.to_string());

        match self.entries.get(reference) {
            Some(SourceEntry::Image(image)) => Ok(image.clone()),
            Some(SourceEntry::Undecodable) => Err(PipelineError::DecodeFailed {
                reference: reference.to_string(),
                source: ImageError::Decoding(DecodingError::new(
                    ImageFormatHint::Unknown,
                    "mock: not an image",
                )),
            }),
            Some(SourceEntry::Unreadable) | None => Err(PipelineError::SourceUnreadable {
                reference: reference.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock: no such reference"),
            }),
        }
    }
}

#[derive(Default)]
struct DetectorState {
    /// Answers to successive availability checks; the last one repeats.
    operational: Vec<bool>,
    detections: Vec<Detection>,
    detect_error: Option<String>,
    last_image: Option<DynamicImage>,
    options: Vec<DetectorOptions>,
    checks: usize,
    detects: usize,
    releases: usize,
}

/// Mock implementation of `FaceDetector`, created by [`MockDetectorFactory`].
pub struct MockDetector {
    state: Arc<Mutex<DetectorState>>,
}

impl FaceDetector for MockDetector {
    fn check_operational(&self) -> bool {
        let mut state = lock(&self.state);
        let answer = state
            .operational
            .get(state.checks)
            .or_else(|| state.operational.last())
            .copied()
            .unwrap_or(true);
        state.checks += 1;
        answer
    }

    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        let mut state = lock(&self.state);
        state.detects += 1;
        state.last_image = Some(image.clone());
        if let Some(message) = &state.detect_error {
            anyhow::bail!("{message}");
        }
        Ok(state.detections.clone())
    }

    fn release(&mut self) {
        lock(&self.state).releases += 1;
    }
}

/// Mock implementation of `DetectorFactory`.
///
/// Every created detector shares one script and one set of counters.
#[derive(Clone, Default)]
pub struct MockDetectorFactory {
    state: Arc<Mutex<DetectorState>>,
}

impl MockDetectorFactory {
    /// A factory whose detectors are operational on the first check.
    #[must_use]
    pub fn operational() -> Self {
        Self::with_availability(&[true])
    }

    /// A factory whose detectors never become operational.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::with_availability(&[false])
    }

    /// Scripts successive availability answers; the last one repeats.
    #[must_use]
    pub fn with_availability(answers: &[bool]) -> Self {
        let factory = Self::default();
        lock(&factory.state).operational = answers.to_vec();
        factory
    }

    /// Sets the detections every `detect` call returns.
    #[must_use]
    pub fn with_detections(self, detections: Vec<Detection>) -> Self {
        lock(&self.state).detections = detections;
        self
    }

    /// Makes every `detect` call fail with `message`.
    #[must_use]
    pub fn failing_detection(self, message: &str) -> Self {
        lock(&self.state).detect_error = Some(message.to_string());
        self
    }

    /// Number of detectors created.
    #[must_use]
    pub fn create_count(&self) -> usize {
        lock(&self.state).options.len()
    }

    /// Options passed to each `create` call.
    #[must_use]
    pub fn created_options(&self) -> Vec<DetectorOptions> {
        lock(&self.state).options.clone()
    }

    /// Number of `check_operational` calls across all detectors.
    #[must_use]
    pub fn check_count(&self) -> usize {
        lock(&self.state).checks
    }

    /// Number of `detect` calls across all detectors.
    #[must_use]
    pub fn detect_count(&self) -> usize {
        lock(&self.state).detects
    }

    /// The image passed to the most recent `detect` call.
    #[must_use]
    pub fn last_image(&self) -> Option<DynamicImage> {
        lock(&self.state).last_image.clone()
    }

    /// Number of `release` calls across all detectors.
    #[must_use]
    pub fn release_count(&self) -> usize {
        lock(&self.state).releases
    }
}

impl DetectorFactory for MockDetectorFactory {
    fn create(&self, options: &DetectorOptions) -> Box<dyn FaceDetector> {
        lock(&self.state).options.push(*options);
        Box::new(MockDetector {
            state: Arc::clone(&self.state),
        })
    }
}

/// Mock implementation of `Notifier` capturing messages.
#[derive(Clone, Default)]
pub struct MockNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MockNotifier {
    /// Creates a notifier with no captured messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}

/// Mock implementation of `Presenter` capturing canvas sizes.
#[derive(Clone, Default)]
pub struct MockPresenter {
    presented: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl MockPresenter {
    /// Creates a presenter with nothing presented.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions of every presented canvas.
    #[must_use]
    pub fn presented(&self) -> Vec<(u32, u32)> {
        lock(&self.presented).clone()
    }
}

impl Presenter for MockPresenter {
    fn present(&self, canvas: &RasterImage) -> anyhow::Result<()> {
        lock(&self.presented).push(canvas.dimensions());
        Ok(())
    }
}

/// Mock implementation of `ProgressSink`.
///
/// Captures events for later assertions.
#[derive(Clone, Default)]
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        lock(&self.events).clone()
    }

    /// Failure kind of the `Failed` event, if one was received.
    #[must_use]
    pub fn failure(&self) -> Option<&'static str> {
        self.events().iter().find_map(|e| match e {
            PipelineEvent::Failed { kind } => Some(*kind),
            _ => None,
        })
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: PipelineEvent) {
        lock(&self.events).push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_script_repeats_last() {
        let factory = MockDetectorFactory::with_availability(&[false, true]);
        let detector = factory.create(&DetectorOptions::still_image());
        assert!(!detector.check_operational());
        assert!(detector.check_operational());
        assert!(detector.check_operational());
        assert_eq!(factory.check_count(), 3);
    }

    #[test]
    fn test_unknown_reference_is_unreadable() {
        let source = MockImageSource::new();
        let err = source.load("missing").unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnreadable { .. }));
        assert_eq!(source.loads(), vec!["missing".to_string()]);
    }

    #[test]
    fn test_release_counted_across_clones() {
        let factory = MockDetectorFactory::operational();
        let mut detector = factory.clone().create(&DetectorOptions::default());
        detector.release();
        assert_eq!(factory.release_count(), 1);
    }
}
