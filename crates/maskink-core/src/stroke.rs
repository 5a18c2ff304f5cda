//! Freehand mask strokes.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Which compositing rule a stroke uses when it is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MaskTool {
    /// Adds coverage to the mask ("draw over").
    #[default]
    Paint,
    /// Removes coverage from the mask down to transparent ("cut out").
    Erase,
}

/// One continuous paint or erase action.
///
/// Points are only appended while the drawing session that produced the
/// stroke is active; afterwards the stroke is treated as immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    tool: MaskTool,
    /// Half of the brush diameter; rasterized at `width * 2`.
    width: f64,
    points: Vec<Point>,
}

impl Stroke {
    /// Start a stroke at a single point.
    pub fn begin(tool: MaskTool, width: f64, start: Point) -> Self {
        Self {
            tool,
            width,
            points: vec![start],
        }
    }

    /// Create from existing points.
    pub fn from_points(tool: MaskTool, width: f64, points: Vec<Point>) -> Self {
        Self { tool, width, points }
    }

    pub fn tool(&self) -> MaskTool {
        self.tool
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Width of the rasterized line in pixels.
    pub fn line_width(&self) -> f64 {
        self.width * 2.0
    }

    /// Points of the polyline, in drawing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub(crate) fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Bounding box of the rasterized footprint, including the round caps.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };

        let mut rect = Rect::from_points(*first, *first);
        for point in &self.points[1..] {
            rect = rect.union_pt(*point);
        }

        let radius = self.line_width() / 2.0;
        rect.inflate(radius, radius)
    }

    /// Centerline segments as `(start, end)` pairs.
    ///
    /// A single-point stroke yields one degenerate segment.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let single = match self.points.as_slice() {
            [only] => Some((*only, *only)),
            _ => None,
        };
        single
            .into_iter()
            .chain(self.points.windows(2).map(|segment| (segment[0], segment[1])))
    }

    /// Distance from `point` to the stroke's centerline.
    ///
    /// Degenerate segments (a tap) measure the distance to the point itself,
    /// which is what makes a two-point tap render as a dot.
    pub fn distance_to(&self, point: Point) -> f64 {
        self.segments()
            .map(|(start, end)| segment_distance(point, start, end))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Distance from a point to the closed segment `start..end`.
pub fn segment_distance(point: Point, start: Point, end: Point) -> f64 {
    let line_vec: Vec2 = end - start;
    let point_vec: Vec2 = point - start;

    let line_len_sq = line_vec.hypot2();
    if line_len_sq < f64::EPSILON {
        return point_vec.hypot();
    }

    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = start + line_vec * t;
    projection.distance(point)
}
