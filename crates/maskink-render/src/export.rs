//! Export of the canonical mask as an encoded PNG.
//!
//! Export works on a [`MaskSnapshot`] taken when the user asks for it, so
//! strokes drawn while the source image is still decoding are not included.

use crate::compositor::render_export;
use crate::source::{SourceImage, SourceState};
use base64::{Engine, engine::general_purpose::STANDARD};
use maskink_core::MaskSnapshot;
use std::fmt::Display;
use std::future::Future;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Source image is not loaded yet")]
    EmptySource,
    #[error("Failed to decode source image: {0}")]
    DecodeFailure(String),
    #[error("Failed to encode mask: {0}")]
    Encode(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// An encoded mask ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedMask {
    /// PNG bytes.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportedMask {
    /// The PNG bytes as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    /// The PNG as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

/// Composite and encode a snapshot against a decoded source image.
pub fn export_with_source(snapshot: &MaskSnapshot, source: &SourceImage) -> ExportResult<ExportedMask> {
    let mask = render_export(&snapshot.strokes, source, snapshot.invert);
    let (width, height) = mask.dimensions();
    let png = encode_png(mask.as_raw(), width, height)?;

    log::info!(
        "Exported {}x{} mask from {} strokes{} ({} bytes)",
        width,
        height,
        snapshot.strokes.len(),
        if snapshot.invert { ", inverted" } else { "" },
        png.len()
    );
    Ok(ExportedMask { png, width, height })
}

/// Export against the current source state.
///
/// Returns [`ExportError::EmptySource`] while the image is still loading,
/// so the caller can retry once it is ready.
pub fn export_mask(snapshot: &MaskSnapshot, source: &SourceState) -> ExportResult<ExportedMask> {
    let image = source.image().inspect_err(|e| log::warn!("Export unavailable: {}", e))?;
    export_with_source(snapshot, image)
}

/// Wait for the source bytes, decode them, then export the snapshot.
///
/// The snapshot is owned, so history edits made while `load` is pending do
/// not affect the result. A load or decode failure ends this export; there
/// is no retry.
pub async fn export_after_load<F, E>(snapshot: MaskSnapshot, load: F) -> ExportResult<ExportedMask>
where
    F: Future<Output = Result<Vec<u8>, E>>,
    E: Display,
{
    let bytes = load.await.map_err(|e| {
        log::error!("Failed to load source image: {}", e);
        ExportError::DecodeFailure(e.to_string())
    })?;
    let source = SourceImage::decode(&bytes)?;
    export_with_source(&snapshot, &source)
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> ExportResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(|e| {
            log::error!("Failed to write PNG header: {:?}", e);
            ExportError::Encode(e.to_string())
        })?;

        writer.write_image_data(rgba_data).map_err(|e| {
            log::error!("Failed to write PNG data: {:?}", e);
            ExportError::Encode(e.to_string())
        })?;

        writer.finish().map_err(|e| ExportError::Encode(e.to_string()))?;
    }

    Ok(png_data)
}
