//! Presenter writing annotated canvases to an image file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use facemark_core::{Presenter, RasterImage};
use tracing::info;

/// Saves the canvas to a fixed path; the format follows the extension.
#[derive(Debug, Clone)]
pub struct FilePresenter {
    path: PathBuf,
}

impl FilePresenter {
    /// Creates a presenter writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Presenter for FilePresenter {
    fn present(&self, canvas: &RasterImage) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        canvas
            .as_rgb()
            .save(&self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("Wrote {}", self.path.display());
        Ok(())
    }
}
