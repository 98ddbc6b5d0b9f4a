//! Annotate command - outline faces and landmarks in one image.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use facemark_adapters::{model_path, models_dir, FilePresenter, FsImageSource};
use facemark_core::detectors::{BlazeFaceFactory, DEFAULT_MIN_CONFIDENCE};
use facemark_core::{
    AnnotationPipeline, DetectorOptions, LandmarkMode, PipelineError, Presenter, RetryPolicy,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{Report, Spinner, StderrNotifier};

/// Hardcoded fallbacks when neither CLI nor config set a value.
mod defaults {
    pub const BACKOFF_SECS: f64 = 5.0;
    pub const OUTPUT_SUFFIX: &str = "annotated.png";
}

/// Parse and validate a confidence value (0.0-1.0).
fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse a non-negative number of seconds that fits in a `Duration`.
fn parse_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    match Duration::try_from_secs_f64(value) {
        Ok(_) => Ok(value),
        Err(_) => Err(format!("{value} is not a representable non-negative number of seconds")),
    }
}

/// The image path as the UTF-8 reference handed to the pipeline.
fn image_reference(image: &Path) -> Result<&str> {
    image
        .to_str()
        .with_context(|| format!("Image path is not valid UTF-8: {}", image.display()))
}

/// Arguments for annotating an image.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnnotateArgs {
    /// Image to annotate
    pub image: Option<PathBuf>,

    /// Where to write the annotated image [default: <IMAGE stem>.annotated.png]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print a JSON report to stdout
    #[arg(long)]
    pub report: bool,

    /// Detector availability checks before giving up
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Seconds to wait between availability checks
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub backoff_secs: Option<f64>,

    /// Minimum face confidence (0.0-1.0)
    #[arg(long, value_parser = parse_confidence)]
    pub min_confidence: Option<f32>,

    /// Draw face boxes only
    #[arg(long)]
    pub no_landmarks: bool,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Show progress spinner
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl AnnotateArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.max_attempts = args.max_attempts.or(config.detector.max_attempts);
        args.backoff_secs = args.backoff_secs.or(config.detector.backoff_secs);
        args.min_confidence = args.min_confidence.or(config.detector.min_confidence);

        // --no-landmarks wins; otherwise config may turn markers off
        if !args.no_landmarks {
            args.no_landmarks = config.detector.landmarks == Some(false);
        }
        if !args.report {
            args.report = config.output.report.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }

        args
    }

    fn retry_policy(&self) -> RetryPolicy {
        let backoff = self.backoff_secs.unwrap_or(defaults::BACKOFF_SECS);
        RetryPolicy::new(
            self.max_attempts
                .unwrap_or(RetryPolicy::DEFAULT_MAX_ATTEMPTS),
            Duration::try_from_secs_f64(backoff).unwrap_or(RetryPolicy::DEFAULT_BACKOFF),
        )
    }

    fn min_confidence(&self) -> f32 {
        self.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE)
    }

    const fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            tracking: false,
            landmarks: if self.no_landmarks {
                LandmarkMode::None
            } else {
                LandmarkMode::All
            },
        }
    }

    fn models_dir(&self) -> PathBuf {
        self.models_dir.clone().unwrap_or_else(models_dir)
    }
}

/// Default output path: `<stem>.annotated.png` beside the input.
fn default_output(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    image.with_file_name(format!("{stem}.{}", defaults::OUTPUT_SUFFIX))
}

/// Run the annotate command.
///
/// Expects `args` to have been processed through `with_config()` first.
pub fn run(args: &AnnotateArgs) -> Result<ExitCode> {
    let image = args
        .image
        .as_deref()
        .context("No image specified. Use --help for usage information.")?;
    let reference = image_reference(image)?;
    info!("Annotating {reference}");

    let models_dir = args.models_dir();
    let weights = model_path("blazeface", &models_dir).context("BlazeFace is not a known model")?;
    debug!("Using weights {}", weights.display());

    let detectors = BlazeFaceFactory::new(weights).with_min_confidence(args.min_confidence());
    let mut pipeline = AnnotationPipeline::new(
        Box::new(FsImageSource::new()),
        Box::new(detectors),
        Box::new(StderrNotifier),
    )
    .with_retry(args.retry_policy())
    .with_options(args.detector_options());

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    if show_progress {
        pipeline = pipeline.with_progress(Box::new(Spinner::new()));
    }

    let annotation = match pipeline.run_detailed(reference) {
        Ok(annotation) => annotation,
        Err(PipelineError::DetectorUnavailable { attempts }) => {
            debug!("Giving up after {attempts} availability check(s)");
            return Ok(ExitCode::DetectorUnavailable);
        }
        Err(e) => return Err(e.into()),
    };

    let output = args.output.clone().unwrap_or_else(|| default_output(image));
    FilePresenter::new(&output).present(&annotation.canvas)?;

    if args.report {
        Report::new(
            image,
            &output,
            annotation.canvas.dimensions(),
            &annotation.detections,
        )
        .write_to(std::io::stdout().lock())?;
    }

    Ok(ExitCode::Success)
}
