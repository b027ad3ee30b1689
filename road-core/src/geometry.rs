//! Geometry primitives shared by the generator and the renderer.
//!
//! All coordinates are integers. Endpoint arithmetic truncates toward zero
//! so that a road shortened step by step always lands on the same pixels
//! the renderer draws.

use crate::types::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Padding added on both sides of a road, perpendicular to its
/// orientation, when building its bounding rectangle.
pub const ROAD_PADDING: i32 = 10;

/// Maps any angle in degrees into `[0, 360)`.
pub fn normalize_angle(angle: i32) -> i32 {
    angle.rem_euclid(360)
}

/// Axis-aligned rectangle with half-open bounds: `min` is inside,
/// `max` is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Builds a rectangle from two corners, swapping coordinates so that
    /// `min <= max` on both axes.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    pub fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// Integer center, rounded toward `min`.
    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }

    /// A rectangle with no interior on at least one axis.
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x < self.max.x && self.min.y <= p.y && p.y < self.max.y
    }

    /// Returns `true` if both rectangles share a non-empty interior.
    /// Empty rectangles never overlap anything.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// A straight road piece starting at `start` and heading `angle` degrees
/// for `length` units.
///
/// A negative `length` points the road behind its nominal direction.
/// `width` is the stroke thickness used when drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadSegment {
    pub start: Point,
    pub length: i32,
    pub angle: i32,
    pub width: i32,
}

impl RoadSegment {
    pub fn new(start: Point, length: i32, angle: i32, width: i32) -> Self {
        Self {
            start,
            length,
            angle: normalize_angle(angle),
            width,
        }
    }

    /// Endpoint of the road. Each offset is `length * trig(angle)`
    /// truncated toward zero; coordinates saturate at the `i32` bounds.
    pub fn end(&self) -> Point {
        let fi = self.angle as f64 * PI / 180.0;
        let dx = (self.length as f64 * fi.cos()) as i32;
        let dy = (self.length as f64 * fi.sin()) as i32;
        self.start.saturating_add(Point::new(dx, dy))
    }

    /// A road is horizontal unless its endpoints share an x coordinate.
    ///
    /// A road whose end coincides with its start counts as horizontal.
    pub fn is_horizontal(&self) -> bool {
        self.start.x != self.end().x
    }

    /// The road's footprint padded by [`ROAD_PADDING`] across its
    /// orientation: on the y-axis for horizontal roads, on the x-axis for
    /// vertical ones.
    pub fn bounding_rect(&self) -> Rect {
        let (s, e) = (self.start, self.end());
        if self.is_horizontal() {
            Rect::new(s.x, s.y - ROAD_PADDING, e.x, e.y + ROAD_PADDING)
        } else {
            Rect::new(s.x - ROAD_PADDING, s.y, e.x + ROAD_PADDING, e.y)
        }
    }
}
