//! JSON report for a finished annotation.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use facemark_core::Detection;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Summary of one annotation run.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Input image path.
    pub path: String,
    /// Written annotated image.
    pub output: String,
    /// Completion time, RFC 3339.
    pub timestamp: String,
    /// Canvas size.
    pub dimensions: Dimensions,
    /// Faces drawn, in pixel coordinates.
    pub faces: &'a [Detection],
}

impl<'a> Report<'a> {
    /// Builds a report stamped with the current UTC time.
    pub fn new(
        path: &Path,
        output: &Path,
        (width, height): (u32, u32),
        faces: &'a [Detection],
    ) -> Self {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            path: path.display().to_string(),
            output: output.display().to_string(),
            timestamp,
            dimensions: Dimensions { width, height },
            faces,
        }
    }

    /// Writes the report as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to(&self, mut writer: impl Write) -> Result<()> {
        serde_json::to_writer(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}
