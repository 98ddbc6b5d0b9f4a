//! Image source port for resolving a reference into a decoded image.

use image::DynamicImage;

use crate::error::PipelineError;

/// Port for loading the image to annotate.
pub trait ImageSource: Send + Sync {
    /// Resolves `reference` and decodes it.
    ///
    /// Any handle opened for the reference must be closed before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnreadable`] if the reference cannot be
    /// opened and [`PipelineError::DecodeFailed`] if its bytes are not an image.
    fn load(&self, reference: &str) -> Result<DynamicImage, PipelineError>;
}
