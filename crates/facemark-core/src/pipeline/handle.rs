//! Scoped ownership of a detector.

use std::fmt;

use tracing::debug;

use crate::ports::FaceDetector;

/// Owns a detector for one run and releases it exactly once.
///
/// Release happens on [`DetectorHandle::release`] or, failing that, on drop,
/// so every exit path of a run frees the backend.
pub struct DetectorHandle {
    detector: Box<dyn FaceDetector>,
    released: bool,
}

impl DetectorHandle {
    /// Takes ownership of a freshly constructed detector.
    #[must_use]
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self {
            detector,
            released: false,
        }
    }

    /// The wrapped detector.
    #[must_use]
    pub fn detector(&self) -> &dyn FaceDetector {
        self.detector.as_ref()
    }

    /// Releases the detector now.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.detector.release();
            debug!("Detector released");
        }
    }
}

impl Drop for DetectorHandle {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for DetectorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorHandle")
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Detection;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting(Arc<AtomicUsize>);

    impl FaceDetector for Counting {
        fn check_operational(&self) -> bool {
            true
        }

        fn detect(&self, _image: &image::DynamicImage) -> anyhow::Result<Vec<Detection>> {
            Ok(vec![])
        }

        fn release(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_explicit_release_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = DetectorHandle::new(Box::new(Counting(Arc::clone(&count))));
        handle.release();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let _handle = DetectorHandle::new(Box::new(Counting(Arc::clone(&count))));
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_on_unwind() {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let result = std::panic::catch_unwind(move || {
            let _handle = DetectorHandle::new(Box::new(Counting(inner)));
            panic!("detector blew up");
        });
        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
