//! Source image the mask is drawn over.

use crate::export::{ExportError, ExportResult};
use image::RgbaImage;
use kurbo::Point;

/// Encoded image format, detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A decoded source image in straight-alpha RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Decode PNG, JPEG or WebP bytes.
    pub fn decode(data: &[u8]) -> ExportResult<Self> {
        let format = ImageFormat::from_magic_bytes(data);
        match image::load_from_memory(data) {
            Ok(decoded) => {
                let pixels = decoded.to_rgba8();
                log::debug!(
                    "Decoded {} source image {}x{}",
                    format.map_or("unknown", |f| f.mime_type()),
                    pixels.width(),
                    pixels.height()
                );
                Ok(Self { pixels })
            }
            Err(e) => {
                log::error!("Failed to decode source image ({} bytes): {}", data.len(), e);
                Err(ExportError::DecodeFailure(e.to_string()))
            }
        }
    }

    /// Wrap already decoded pixels.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn center(&self) -> Point {
        Point::new(self.width() as f64 / 2.0, self.height() as f64 / 2.0)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Loading state of the source image, as seen by export.
#[derive(Debug, Clone, Default)]
pub enum SourceState {
    /// No image yet, or still decoding.
    #[default]
    Pending,
    Ready(SourceImage),
    /// Decoding failed; export stays unavailable until a new image arrives.
    Failed(String),
}

impl SourceState {
    /// Decode bytes into a ready or failed state.
    pub fn from_bytes(data: &[u8]) -> Self {
        match SourceImage::decode(data) {
            Ok(image) => SourceState::Ready(image),
            Err(ExportError::DecodeFailure(reason)) => SourceState::Failed(reason),
            Err(e) => SourceState::Failed(e.to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SourceState::Ready(_))
    }

    /// The decoded image, or the reason export cannot run yet.
    pub fn image(&self) -> ExportResult<&SourceImage> {
        match self {
            SourceState::Ready(image) => Ok(image),
            SourceState::Pending => Err(ExportError::EmptySource),
            SourceState::Failed(reason) => Err(ExportError::DecodeFailure(reason.clone())),
        }
    }
}
