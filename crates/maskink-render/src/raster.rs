//! Flat coverage layer that strokes are rasterized into.
//!
//! The mask colour is uniform, so the flattened layer only needs one
//! coverage value per pixel. Every stroke is fully resolved into this plane
//! before any group opacity or source-image rule is applied, which keeps
//! overlapping strokes from blending twice.

use image::RgbaImage;
use kurbo::{Point, Rect};
use maskink_core::{MaskTool, Stroke, segment_distance};

/// How a primitive combines with the coverage already in the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeRule {
    /// `a = s + d * (1 - s)`
    SourceOver,
    /// `a = d * (1 - s)`
    DestinationOut,
}

impl From<MaskTool> for CompositeRule {
    fn from(tool: MaskTool) -> Self {
        match tool {
            MaskTool::Paint => CompositeRule::SourceOver,
            MaskTool::Erase => CompositeRule::DestinationOut,
        }
    }
}

impl CompositeRule {
    fn apply(self, dst: f32, src: f32) -> f32 {
        match self {
            CompositeRule::SourceOver => src + dst * (1.0 - src),
            CompositeRule::DestinationOut => dst * (1.0 - src),
        }
    }
}

/// Anti-aliased coverage of a pixel centre at `distance` from a shape edge
/// of the given `radius`.
fn edge_coverage(distance: f64, radius: f64) -> f32 {
    (radius + 0.5 - distance).clamp(0.0, 1.0) as f32
}

/// Single-channel coverage buffer, row-major, values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskLayer {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl MaskLayer {
    /// Create a fully transparent layer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    /// Rasterize strokes in order into a new flattened layer.
    pub fn flatten(strokes: &[Stroke], width: u32, height: u32) -> Self {
        let mut layer = Self::new(width, height);
        for stroke in strokes {
            layer.draw_stroke(stroke);
        }
        layer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at a pixel; zero outside the layer.
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.coverage[self.index(x, y)]
    }

    /// True when no pixel has any coverage.
    pub fn is_empty(&self) -> bool {
        self.coverage.iter().all(|c| *c <= 0.0)
    }

    /// Draw a stroke's polyline with round caps and joins.
    ///
    /// The stroke is one primitive: where its own segments overlap, coverage
    /// is the maximum, not an accumulation.
    ///
    /// Each segment is only evaluated over its own bounds, into a scratch
    /// plane covering the stroke. The scratch is then combined with the
    /// layer once using the stroke's rule.
    pub fn draw_stroke(&mut self, stroke: &Stroke) {
        if stroke.is_empty() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.pixel_span(stroke.bounds().inflate(1.0, 1.0)) else {
            return;
        };
        let span_width = (x1 - x0) as usize;
        let mut scratch = vec![0.0f32; span_width * (y1 - y0) as usize];
        let radius = stroke.line_width() / 2.0;

        for (start, end) in stroke.segments() {
            let bounds = Rect::from_points(start, end).inflate(radius + 1.0, radius + 1.0);
            let Some((sx0, sy0, sx1, sy1)) = self.pixel_span(bounds) else {
                continue;
            };
            for y in sy0..sy1 {
                let row = (y - y0) as usize * span_width;
                for x in sx0..sx1 {
                    let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                    let src = edge_coverage(segment_distance(center, start, end), radius);
                    let cell = &mut scratch[row + (x - x0) as usize];
                    *cell = cell.max(src);
                }
            }
        }

        let rule = CompositeRule::from(stroke.tool());
        for y in y0..y1 {
            let row = (y - y0) as usize * span_width;
            for x in x0..x1 {
                let src = scratch[row + (x - x0) as usize];
                if src <= 0.0 {
                    continue;
                }
                let index = self.index(x, y);
                self.coverage[index] = rule.apply(self.coverage[index], src);
            }
        }
    }

    /// Draw a filled disc (the brush preview).
    pub fn draw_disc(&mut self, center: Point, radius: f64, rule: CompositeRule) {
        let bounds = Rect::from_center_size(center, (radius * 2.0, radius * 2.0));
        self.draw_shape(bounds, rule, |p| edge_coverage(p.distance(center), radius));
    }

    /// Multiply the layer by the source image's alpha ("source-in").
    ///
    /// Afterwards only pixels covered by both the strokes and the opaque
    /// part of the source remain.
    pub fn intersect_alpha(&mut self, source: &RgbaImage) {
        for y in 0..self.height {
            for x in 0..self.width {
                let index = self.index(x, y);
                self.coverage[index] *= source_alpha(source, x, y);
            }
        }
    }

    /// Replace the layer with the source image's alpha minus the layer.
    pub fn subtract_from_alpha(&mut self, source: &RgbaImage) {
        for y in 0..self.height {
            for x in 0..self.width {
                let index = self.index(x, y);
                let alpha = source_alpha(source, x, y);
                self.coverage[index] = (alpha - self.coverage[index]).max(0.0);
            }
        }
    }

    /// Quantized 8-bit coverage, row-major.
    pub fn to_alpha_bytes(&self) -> Vec<u8> {
        self.coverage.iter().map(|c| quantize(*c)).collect()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Run `coverage_at` over the pixels whose centres may fall inside
    /// `bounds` and combine the result with `rule`.
    fn draw_shape(&mut self, bounds: Rect, rule: CompositeRule, coverage_at: impl Fn(Point) -> f32) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(bounds.inflate(1.0, 1.0)) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let src = coverage_at(Point::new(x as f64 + 0.5, y as f64 + 0.5));
                if src <= 0.0 {
                    continue;
                }
                let index = self.index(x, y);
                self.coverage[index] = rule.apply(self.coverage[index], src);
            }
        }
    }

    /// Clip a rectangle to the layer, in whole pixels (end exclusive).
    fn pixel_span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x0.floor().max(0.0);
        let y0 = rect.y0.floor().max(0.0);
        let x1 = rect.x1.ceil().min(self.width as f64);
        let y1 = rect.y1.ceil().min(self.height as f64);

        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Alpha of a source pixel in `[0, 1]`; transparent outside the image.
pub(crate) fn source_alpha(source: &RgbaImage, x: u32, y: u32) -> f32 {
    if x >= source.width() || y >= source.height() {
        return 0.0;
    }
    source.get_pixel(x, y).0[3] as f32 / 255.0
}

pub(crate) fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn line(tool: MaskTool, width: f64, from: (f64, f64), to: (f64, f64)) -> Stroke {
        Stroke::from_points(
            tool,
            width,
            vec![Point::new(from.0, from.1), Point::new(to.0, to.1)],
        )
    }

    #[test]
    fn test_paint_covers_centerline() {
        let layer = MaskLayer::flatten(
            &[line(MaskTool::Paint, 2.0, (5.0, 10.0), (25.0, 10.0))],
            32,
            20,
        );

        assert!((layer.coverage(15, 9) - 1.0).abs() < f32::EPSILON);
        assert!((layer.coverage(15, 10) - 1.0).abs() < f32::EPSILON);
        // Line width is 4px: rows far above and below stay empty.
        assert_eq!(layer.coverage(15, 2), 0.0);
        assert_eq!(layer.coverage(15, 17), 0.0);
        // Round cap extends past the endpoint.
        assert!(layer.coverage(26, 9) > 0.0);
        assert_eq!(layer.coverage(31, 9), 0.0);
    }

    #[test]
    fn test_tap_renders_as_dot() {
        let layer = MaskLayer::flatten(
            &[line(MaskTool::Paint, 3.0, (10.0, 10.0), (10.0, 10.0))],
            20,
            20,
        );

        assert!((layer.coverage(9, 9) - 1.0).abs() < f32::EPSILON);
        assert!((layer.coverage(10, 10) - 1.0).abs() < f32::EPSILON);
        assert_eq!(layer.coverage(17, 10), 0.0);
        assert_eq!(layer.coverage(2, 2), 0.0);
    }

    #[test]
    fn test_erase_cuts_out_paint() {
        let layer = MaskLayer::flatten(
            &[
                line(MaskTool::Paint, 3.0, (0.0, 10.0), (40.0, 10.0)),
                line(MaskTool::Erase, 6.0, (20.0, 0.0), (20.0, 20.0)),
            ],
            40,
            20,
        );

        assert_eq!(layer.coverage(20, 10), 0.0);
        assert_eq!(layer.coverage(19, 9), 0.0);
        assert!((layer.coverage(5, 10) - 1.0).abs() < f32::EPSILON);
        assert!((layer.coverage(35, 10) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_paint_after_erase_restores() {
        let layer = MaskLayer::flatten(
            &[
                line(MaskTool::Paint, 3.0, (0.0, 10.0), (40.0, 10.0)),
                line(MaskTool::Erase, 10.0, (0.0, 10.0), (40.0, 10.0)),
                line(MaskTool::Paint, 3.0, (0.0, 10.0), (40.0, 10.0)),
            ],
            40,
            20,
        );
        assert!((layer.coverage(20, 10) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_self_overlap_does_not_accumulate() {
        // Back-and-forth scribble over the same spot.
        let stroke = Stroke::from_points(
            MaskTool::Paint,
            2.0,
            vec![
                Point::new(2.0, 10.0),
                Point::new(18.0, 10.0),
                Point::new(2.0, 10.0),
                Point::new(18.0, 10.0),
            ],
        );
        let once = MaskLayer::flatten(&[line(MaskTool::Paint, 2.0, (2.0, 10.0), (18.0, 10.0))], 20, 20);
        let scribble = MaskLayer::flatten(&[stroke], 20, 20);
        assert_eq!(once.to_alpha_bytes(), scribble.to_alpha_bytes());
    }

    /// Evaluates every pixel against the whole polyline.
    fn draw_stroke_per_pixel(layer: &mut MaskLayer, stroke: &Stroke) {
        let radius = stroke.line_width() / 2.0;
        let rule = CompositeRule::from(stroke.tool());
        for y in 0..layer.height {
            for x in 0..layer.width {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let src = edge_coverage(stroke.distance_to(center), radius);
                if src > 0.0 {
                    let index = layer.index(x, y);
                    layer.coverage[index] = rule.apply(layer.coverage[index], src);
                }
            }
        }
    }

    fn zigzag(tool: MaskTool, width: f64, count: usize, size: f64) -> Stroke {
        let points = (0..count)
            .map(|i| {
                let x = (i as f64 * 7.3) % size;
                let edge = if i % 2 == 0 { 3.0 } else { size - 3.0 };
                let y = edge + (i % 5) as f64;
                Point::new(x, y)
            })
            .collect();
        Stroke::from_points(tool, width, points)
    }

    #[test]
    fn test_long_strokes_match_per_pixel_rasterization() {
        for count in [2, 16, 128, 600] {
            let strokes = [
                zigzag(MaskTool::Paint, 6.0, count, 64.0),
                zigzag(MaskTool::Erase, 2.5, count / 2 + 1, 48.0),
            ];
            let fast = MaskLayer::flatten(&strokes, 64, 64);

            let mut reference = MaskLayer::new(64, 64);
            for stroke in &strokes {
                draw_stroke_per_pixel(&mut reference, stroke);
            }

            assert_eq!(fast.to_alpha_bytes(), reference.to_alpha_bytes(), "{} points", count);
            assert!(!fast.is_empty());
        }
    }

    #[test]
    fn test_strokes_outside_layer_are_clipped() {
        let layer = MaskLayer::flatten(
            &[line(MaskTool::Paint, 5.0, (-100.0, -100.0), (-50.0, -50.0))],
            10,
            10,
        );
        assert!(layer.is_empty());

        let partial = MaskLayer::flatten(
            &[line(MaskTool::Paint, 5.0, (-10.0, 5.0), (5.0, 5.0))],
            10,
            10,
        );
        assert!((partial.coverage(0, 5) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disc_rules() {
        let mut layer = MaskLayer::new(20, 20);
        layer.draw_disc(Point::new(10.0, 10.0), 5.0, CompositeRule::SourceOver);
        assert!((layer.coverage(10, 10) - 1.0).abs() < f32::EPSILON);

        layer.draw_disc(Point::new(10.0, 10.0), 3.0, CompositeRule::DestinationOut);
        assert_eq!(layer.coverage(10, 10), 0.0);
        assert!(layer.coverage(10, 5) > 0.0);
    }

    #[test]
    fn test_intersect_and_subtract_alpha() {
        let mut source = RgbaImage::from_pixel(4, 1, Rgba([9, 9, 9, 255]));
        source.put_pixel(1, 0, Rgba([9, 9, 9, 0]));

        let mut layer = MaskLayer::new(4, 1);
        layer.draw_disc(Point::new(1.0, 0.5), 1.0, CompositeRule::SourceOver);
        assert_eq!(layer.to_alpha_bytes(), vec![255, 255, 0, 0]);

        let mut kept = layer.clone();
        kept.intersect_alpha(&source);
        assert_eq!(kept.to_alpha_bytes(), vec![255, 0, 0, 0]);

        kept.subtract_from_alpha(&source);
        assert_eq!(kept.to_alpha_bytes(), vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_tool_rule_mapping() {
        assert_eq!(CompositeRule::from(MaskTool::Paint), CompositeRule::SourceOver);
        assert_eq!(CompositeRule::from(MaskTool::Erase), CompositeRule::DestinationOut);
    }
}
