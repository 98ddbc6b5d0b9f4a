//! Progress spinner adapter using indicatif.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use facemark_core::{PipelineEvent, ProgressSink};

/// Spinner on stderr tracking pipeline stages.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Creates and starts a spinner.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message("Loading image");
        Self { bar }
    }
}

impl ProgressSink for Spinner {
    fn on_event(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::SourceLoaded {
                reference,
                width,
                height,
            } => self.bar.set_message(format!(
                "Loaded {reference} ({width}x{height}), waiting for detector"
            )),
            PipelineEvent::DetectorReady { .. } => self.bar.set_message("Detecting faces"),
            PipelineEvent::FacesDetected { count } => {
                self.bar.set_message(format!("Drawing {count} face(s)"));
            }
            PipelineEvent::Rendered => self.bar.finish_with_message("Annotated"),
            PipelineEvent::Failed { kind } => {
                self.bar.abandon_with_message(format!("Failed: {kind}"));
            }
        }
    }
}
