//! Editor configuration: tool, brush and mask display settings.

use crate::stroke::MaskTool;
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest selectable brush size in pixels.
pub const MIN_BRUSH_SIZE: f64 = 1.0;
/// Largest selectable brush size in pixels.
pub const MAX_BRUSH_SIZE: f64 = 500.0;
/// Brush size change for a single grow/shrink step.
pub const BRUSH_SIZE_STEP: f64 = 5.0;
/// Brush size used before the user picks one.
pub const DEFAULT_BRUSH_SIZE: f64 = 20.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse editor config: {0}")]
    Parse(String),
    #[error("Failed to serialize editor config: {0}")]
    Serialize(String),
}

/// Serializable mask color (peniko's Color has no serde support).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl MaskColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn red() -> Self {
        Self::new(255, 0, 0)
    }

    /// Get as an opaque peniko Color.
    pub fn to_color(self) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, 255)
    }
}

impl Default for MaskColor {
    fn default() -> Self {
        Self::red()
    }
}

impl From<Color> for MaskColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b)
    }
}

/// How the mask is shown on screen.
///
/// Only `invert` changes what gets exported; the other fields are
/// preview-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayMode {
    pub invert: bool,
    pub checkerboard_preview: bool,
    /// Group opacity of the mask layer in plain preview, in `[0, 1]`.
    pub opacity: f64,
    pub hide_mask: bool,
    /// Show the brush disc even when the pointer is off the canvas.
    pub show_brush_preview: bool,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self {
            invert: false,
            checkerboard_preview: false,
            opacity: 1.0,
            hide_mask: false,
            show_brush_preview: false,
        }
    }
}

impl DisplayMode {
    /// Set the mask opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
    }
}

/// Mask editor settings read by the drawing session and the compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub tool: MaskTool,
    /// Brush diameter in pixels.
    pub brush_size: f64,
    pub mask_color: MaskColor,
    pub display: DisplayMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tool: MaskTool::Paint,
            brush_size: DEFAULT_BRUSH_SIZE,
            mask_color: MaskColor::default(),
            display: DisplayMode::default(),
        }
    }
}

impl EditorConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tool(&mut self, tool: MaskTool) {
        self.tool = tool;
    }

    /// Set the brush size, clamped to the selectable range.
    pub fn set_brush_size(&mut self, size: f64) {
        self.brush_size = if size.is_nan() {
            DEFAULT_BRUSH_SIZE
        } else {
            size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
        };
    }

    /// Enlarge the brush by one step.
    pub fn grow_brush(&mut self) {
        self.set_brush_size(self.brush_size + BRUSH_SIZE_STEP);
    }

    /// Shrink the brush by one step, bottoming out at the minimum size.
    pub fn shrink_brush(&mut self) {
        let next = self.brush_size - BRUSH_SIZE_STEP;
        if next > 0.0 {
            self.set_brush_size(next);
        } else {
            self.set_brush_size(MIN_BRUSH_SIZE);
        }
    }

    /// Width recorded on new strokes (half the brush size).
    pub fn stroke_width(&self) -> f64 {
        self.brush_size / 2.0
    }

    /// Load from JSON; missing fields take their defaults and out-of-range
    /// values are clamped.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.set_brush_size(config.brush_size);
        config.display.set_opacity(config.display.opacity);
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::new();
        assert_eq!(config.tool, MaskTool::Paint);
        assert!((config.brush_size - 20.0).abs() < f64::EPSILON);
        assert!((config.stroke_width() - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.mask_color, MaskColor::red());
        assert!(!config.display.invert);
        assert!((config.display.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_brush_size_steps() {
        let mut config = EditorConfig::new();
        config.grow_brush();
        assert!((config.brush_size - 25.0).abs() < f64::EPSILON);

        config.set_brush_size(4.0);
        config.shrink_brush();
        assert!((config.brush_size - MIN_BRUSH_SIZE).abs() < f64::EPSILON);

        config.set_brush_size(10_000.0);
        assert!((config.brush_size - MAX_BRUSH_SIZE).abs() < f64::EPSILON);
        config.grow_brush();
        assert!((config.brush_size - MAX_BRUSH_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_opacity_clamped() {
        let mut display = DisplayMode::default();
        display.set_opacity(1.5);
        assert!((display.opacity - 1.0).abs() < f64::EPSILON);
        display.set_opacity(-0.2);
        assert!(display.opacity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = EditorConfig::new();
        config.set_tool(MaskTool::Erase);
        config.set_brush_size(42.0);
        config.mask_color = MaskColor::new(0, 128, 255);
        config.display.checkerboard_preview = true;

        let json = config.to_json().unwrap();
        let loaded = EditorConfig::from_json(&json).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_json_partial_and_clamped() {
        let config =
            EditorConfig::from_json(r#"{ "brush_size": 900.0, "display": { "opacity": 3.0 } }"#)
                .unwrap();
        assert!((config.brush_size - MAX_BRUSH_SIZE).abs() < f64::EPSILON);
        assert!((config.display.opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.tool, MaskTool::Paint);
    }

    #[test]
    fn test_json_invalid() {
        let result = EditorConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_color_conversion() {
        let color = MaskColor::new(10, 20, 30).to_color();
        assert_eq!(MaskColor::from(color), MaskColor::new(10, 20, 30));
    }
}
