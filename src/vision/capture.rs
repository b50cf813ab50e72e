//! Still capture to disk

use std::path::Path;

use image::ImageFormat;

use super::{Frame, FrameWriter};
use crate::{Error, Result};

/// Writes captures as image files, overwriting the previous one
///
/// The format follows the file extension and falls back to uncompressed BMP.
/// Data goes to a sibling temp file first and is renamed into place, so a
/// reader never sees a half-written capture.
#[derive(Debug, Default, Clone)]
pub struct ImageFileWriter;

impl ImageFileWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FrameWriter for ImageFileWriter {
    fn persist(&mut self, frame: &Frame, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Bmp);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".partial");
        let tmp = std::path::PathBuf::from(tmp);

        frame
            .image
            .save_with_format(&tmp, format)
            .map_err(|e| Error::Capture(format!("{}: {e}", path.display())))?;
        std::fs::rename(&tmp, path)?;

        tracing::info!(path = %path.display(), frame = frame.index, "captured still");
        Ok(())
    }
}
