//! Mask compositing: on-screen preview and canonical export.
//!
//! Both paths start from the same flattened stroke layer. Preview then
//! applies display-only rules (checkerboard, opacity, brush preview);
//! export applies only the inversion rule and is always fully opaque.

use crate::raster::{MaskLayer, quantize, source_alpha};
use crate::source::SourceImage;
use image::{Rgba, RgbaImage};
use kurbo::Point;
use maskink_core::{DisplayMode, MaskColor, MaskEditor, MaskTool, Stroke};
use peniko::Color;

/// Checkerboard cell size in pixels.
pub const CHECKER_SIZE: u32 = 8;
const CHECKER_LIGHT: [u8; 3] = [255, 255, 255];
const CHECKER_DARK: [u8; 3] = [204, 204, 204];
const OUTLINE_COLOR: [u8; 3] = [0, 0, 0];

/// Brush disc shown under the pointer while editing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushPreview {
    pub center: Point,
    pub radius: f64,
    pub tool: MaskTool,
}

/// Everything one preview frame depends on.
pub struct PreviewContext<'a> {
    /// Active strokes, in drawing order.
    pub strokes: &'a [Stroke],
    pub source: &'a SourceImage,
    pub display: DisplayMode,
    pub mask_color: Color,
    pub brush: Option<BrushPreview>,
}

impl<'a> PreviewContext<'a> {
    /// Create a preview context with default display settings.
    pub fn new(strokes: &'a [Stroke], source: &'a SourceImage) -> Self {
        Self {
            strokes,
            source,
            display: DisplayMode::default(),
            mask_color: MaskColor::default().to_color(),
            brush: None,
        }
    }

    /// Build the context from the editor's current state.
    ///
    /// The brush disc follows the pointer; with `show_brush_preview` and no
    /// pointer it sits at the image centre.
    pub fn from_editor(editor: &'a MaskEditor, source: &'a SourceImage) -> Self {
        let config = &editor.config;
        let center = editor
            .session()
            .cursor_position()
            .or_else(|| config.display.show_brush_preview.then(|| source.center()));

        Self::new(editor.active_strokes(), source)
            .with_display(config.display)
            .with_mask_color(config.mask_color.to_color())
            .with_brush(center.map(|center| BrushPreview {
                center,
                radius: config.brush_size / 2.0,
                tool: config.tool,
            }))
    }

    /// Set the display mode.
    pub fn with_display(mut self, display: DisplayMode) -> Self {
        self.display = display;
        self
    }

    /// Set the mask color.
    pub fn with_mask_color(mut self, color: Color) -> Self {
        self.mask_color = color;
        self
    }

    /// Set the brush preview.
    pub fn with_brush(mut self, brush: Option<BrushPreview>) -> Self {
        self.brush = brush;
        self
    }
}

/// Render the on-screen preview. Output is opaque RGBA at source size.
pub fn render_preview(ctx: &PreviewContext) -> RgbaImage {
    let source = ctx.source.pixels();
    let (width, height) = source.dimensions();
    let display = ctx.display;
    let plain = !display.invert && !display.checkerboard_preview;

    let layer = (!display.hide_mask).then(|| {
        let mut layer = MaskLayer::flatten(ctx.strokes, width, height);
        if let Some(brush) = ctx.brush {
            layer.draw_disc(brush.center, brush.radius, brush.tool.into());
        }
        layer
    });

    let mask_rgb = {
        let rgba = ctx.mask_color.to_rgba8();
        [rgba.r, rgba.g, rgba.b]
    };
    let opacity = if plain { display.opacity as f32 } else { 1.0 };

    RgbaImage::from_fn(width, height, |x, y| {
        let src = source.get_pixel(x, y).0;
        let src_rgb = [src[0], src[1], src[2]];
        let src_a = source_alpha(source, x, y);

        let mut rgb = checker_color(x, y);
        if plain {
            rgb = blend(rgb, src_rgb, src_a);
        }

        if let Some(layer) = &layer {
            let coverage = layer.coverage(x, y);
            rgb = if display.invert {
                // Source shows through the strokes only.
                blend(rgb, src_rgb, coverage * src_a)
            } else if display.checkerboard_preview {
                // Strokes punch holes in the source down to the checkerboard.
                blend(rgb, src_rgb, src_a * (1.0 - coverage))
            } else {
                blend(rgb, mask_rgb, coverage * opacity)
            };
        }

        if let Some(brush) = ctx.brush {
            rgb = blend(rgb, OUTLINE_COLOR, outline_coverage(brush, x, y));
        }

        Rgba([rgb[0], rgb[1], rgb[2], 255])
    })
}

/// Render the canonical export mask at source size.
///
/// Pixels are black; alpha is the mask amount. Without inversion the mask
/// is the flattened stroke layer. With inversion the stroke layer is first
/// intersected with the source alpha, and the mask becomes the source's
/// footprint minus that intersection, so an empty history masks the whole
/// opaque source.
pub fn render_export(strokes: &[Stroke], source: &SourceImage, invert: bool) -> RgbaImage {
    let pixels = source.pixels();
    let mut layer = MaskLayer::flatten(strokes, source.width(), source.height());

    if invert {
        layer.intersect_alpha(pixels);
        layer.subtract_from_alpha(pixels);
    }

    RgbaImage::from_fn(source.width(), source.height(), |x, y| {
        Rgba([0, 0, 0, quantize(layer.coverage(x, y))])
    })
}

fn checker_color(x: u32, y: u32) -> [u8; 3] {
    if (x / CHECKER_SIZE + y / CHECKER_SIZE) % 2 == 0 {
        CHECKER_LIGHT
    } else {
        CHECKER_DARK
    }
}

/// Straight-alpha "over" onto an opaque destination.
fn blend(dst: [u8; 3], src: [u8; 3], alpha: f32) -> [u8; 3] {
    if alpha <= 0.0 {
        return dst;
    }
    let alpha = alpha.min(1.0);
    let mix = |d: u8, s: u8| quantize((d as f32 * (1.0 - alpha) + s as f32 * alpha) / 255.0);
    [mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2])]
}

/// One-pixel ring at the brush radius.
fn outline_coverage(brush: BrushPreview, x: u32, y: u32) -> f32 {
    let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
    let distance = center.distance(brush.center);
    (1.0 - (distance - brush.radius).abs()).clamp(0.0, 1.0) as f32
}
