//! Presentation port for finished canvases.

use crate::domain::RasterImage;

/// Port for displaying or handing off an annotated image.
///
/// The pipeline never calls this itself; callers pass the returned canvas on.
pub trait Presenter: Send + Sync {
    /// Presents the annotated canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas cannot be presented.
    fn present(&self, canvas: &RasterImage) -> anyhow::Result<()>;
}
