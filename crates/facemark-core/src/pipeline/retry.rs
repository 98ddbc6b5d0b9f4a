//! Detector availability policy.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::ports::FaceDetector;

/// How often to check detector availability and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total availability checks, including the first.
    pub max_attempts: u32,
    /// Wait between consecutive checks.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Default number of checks: one initial check plus one recheck.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

    /// Default wait before the recheck.
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

    /// Creates a policy.
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BACKOFF)
    }
}

/// Checks `detector` until it reports operational or the attempts run out.
///
/// Blocks the calling thread for `policy.backoff` between checks. A policy
/// with zero attempts still checks once.
///
/// Returns the number of checks used.
///
/// # Errors
///
/// Returns [`PipelineError::DetectorUnavailable`] if every check fails.
pub fn ensure_operational(
    detector: &dyn FaceDetector,
    policy: &RetryPolicy,
) -> Result<u32, PipelineError> {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if detector.check_operational() {
            debug!("Detector operational after {attempt} check(s)");
            return Ok(attempt);
        }
        if attempt < max_attempts {
            warn!(
                "Face detector not operational, rechecking in {:?}",
                policy.backoff
            );
            std::thread::sleep(policy.backoff);
        }
    }

    Err(PipelineError::DetectorUnavailable {
        attempts: max_attempts,
    })
}
