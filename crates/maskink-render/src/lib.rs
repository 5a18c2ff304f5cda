//! MaskInk Render Library
//!
//! CPU compositing of mask strokes over a source image: the live preview
//! shown while editing and the canonical PNG mask handed to consumers.

pub mod compositor;
pub mod export;
pub mod raster;
pub mod source;

pub use compositor::{BrushPreview, PreviewContext, render_export, render_preview};
pub use export::{
    ExportError, ExportResult, ExportedMask, encode_png, export_after_load, export_mask,
    export_with_source,
};
pub use raster::{CompositeRule, MaskLayer};
pub use source::{ImageFormat, SourceImage, SourceState};
