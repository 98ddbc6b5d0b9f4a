//! Configuration file support for facemark.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/facemark/config.toml` (lowest priority)
//! - Project-local: `.facemark.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Face detector settings.
    pub detector: DetectorConfig,
    /// Model settings.
    pub models: ModelsConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Face detector configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Availability checks before giving up.
    pub max_attempts: Option<u32>,
    /// Seconds to wait between availability checks.
    pub backoff_secs: Option<f64>,
    /// Minimum face confidence (0.0-1.0).
    pub min_confidence: Option<f32>,
    /// Draw landmark markers.
    pub landmarks: Option<bool>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print a JSON report to stdout.
    pub report: Option<bool>,
    /// Show a progress spinner.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/facemark/config.toml`
    /// 2. Project-local: `.facemark.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if self.detector.max_attempts == Some(0) {
            return Err("detector.max_attempts must be at least 1, got 0".to_string());
        }
        if let Some(s) = self.detector.backoff_secs {
            if Duration::try_from_secs_f64(s).is_err() {
                return Err(format!(
                    "detector.backoff_secs must be a representable non-negative number, got {s}"
                ));
            }
        }
        if let Some(c) = self.detector.min_confidence {
            if !(0.0..=1.0).contains(&c) {
                return Err(format!("detector.min_confidence must be 0.0-1.0, got {c}"));
            }
        }
        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        let detector = &mut self.detector;
        detector.max_attempts = other.detector.max_attempts.or(detector.max_attempts);
        detector.backoff_secs = other.detector.backoff_secs.or(detector.backoff_secs);
        detector.min_confidence = other.detector.min_confidence.or(detector.min_confidence);
        detector.landmarks = other.detector.landmarks.or(detector.landmarks);

        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());

        self.output.report = other.output.report.or(self.output.report);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("facemark").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.facemark.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".facemark.toml"))
        .find(|path| path.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| warn!("Failed to read config file {}: {e}", path.display()))
        .ok()?;

    toml::from_str(&content)
        .map_err(|e| warn!("Failed to parse config file {}: {e}", path.display()))
        .ok()
}
