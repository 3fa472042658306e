//! Source raster probing.
//!
//! Reads only the image header to learn the native dimensions a document
//! must be georeferenced against. Pixel data is never decoded.

use std::io::Cursor;

use image::ImageReader;
use log::debug;
use thiserror::Error;

use crate::document::SourceInfo;

/// Errors that can occur while probing a source raster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The bytes are not a recognized image format.
    #[error("Unrecognized image format")]
    UnrecognizedFormat,

    /// The header could not be read.
    #[error("Unreadable image header: {0}")]
    UnreadableHeader(String),

    /// The image reports a zero width or height.
    #[error("Image has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}

/// A source raster identified by name and native pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

impl SourceImage {
    /// Read the dimensions of an encoded image.
    ///
    /// # Arguments
    ///
    /// * `filename` - Name recorded in documents; not used for format detection
    /// * `bytes` - Encoded file contents (PNG or JPEG)
    pub fn probe(filename: impl Into<String>, bytes: &[u8]) -> Result<Self, SourceError> {
        let filename = filename.into();
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| SourceError::UnreadableHeader(e.to_string()))?;

        if reader.format().is_none() {
            return Err(SourceError::UnrecognizedFormat);
        }

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| SourceError::UnreadableHeader(e.to_string()))?;
        if width == 0 || height == 0 {
            return Err(SourceError::ZeroSize { width, height });
        }

        debug!("probed '{}': {}x{}", filename, width, height);
        Ok(Self {
            filename,
            width,
            height,
        })
    }

    /// Source description for a new document.
    pub fn to_source_info(&self, coordinate_system: impl Into<String>) -> SourceInfo {
        SourceInfo::new(
            self.filename.clone(),
            self.width,
            self.height,
            coordinate_system,
        )
    }
}
