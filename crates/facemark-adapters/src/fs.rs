//! Filesystem adapter for loading images.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use facemark_core::{ImageSource, PipelineError};
use image::{DynamicImage, ImageReader};
use tracing::{debug, warn};

/// Extensions the bundled decoders handle.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Filesystem image source adapter.
///
/// References are file paths. Relative references resolve against the root
/// directory if one is set, otherwise against the working directory.
#[derive(Debug, Clone, Default)]
pub struct FsImageSource {
    root: Option<PathBuf>,
}

impl FsImageSource {
    /// Creates a source resolving references against the working directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Creates a source resolving relative references against `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageSource for FsImageSource {
    fn load(&self, reference: &str) -> Result<DynamicImage, PipelineError> {
        let path = self.resolve(reference);
        if !is_supported_image(&path) {
            // content sniffing may still find a decoder
            warn!("Unrecognized image extension: {}", path.display());
        }

        let unreadable = |source| PipelineError::SourceUnreadable {
            reference: reference.to_string(),
            source,
        };

        let file = File::open(&path).map_err(unreadable)?;
        let image = ImageReader::new(BufReader::new(file))
            .with_guessed_format()
            .map_err(unreadable)?
            .decode()
            .map_err(|source| PipelineError::DecodeFailed {
                reference: reference.to_string(),
                source,
            })?;

        debug!(
            "Decoded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.as_str()))
}
