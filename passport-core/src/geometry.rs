//! Integer pixel geometry shared by the locator, the crop engine and the verifiers.

use serde::{Deserialize, Serialize};

/// Landmark coordinate in pixels, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Face rectangle as `(top, right, bottom, left)` in the pixel space of the image it was
/// detected on. Serialized as `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl BoundingBox {
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// `bottom - top`; zero or negative for a degenerate box.
    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }

    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    /// A box is usable only when it has a positive extent on both axes.
    pub fn is_degenerate(&self) -> bool {
        self.height() <= 0 || self.width() <= 0
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([top, right, bottom, left]: [i32; 4]) -> Self {
        Self::new(top, right, bottom, left)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.top, b.right, b.bottom, b.left]
    }
}

/// Area enclosed by the ring `points` (shoelace formula, absolute value).
///
/// The ring is closed implicitly; repeated vertices are harmless. Fewer than three
/// points enclose nothing.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    (twice_area as f64 / 2.0).abs()
}

/// Midpoint of two coordinates.
pub(crate) fn midpoint(a: i32, b: i32) -> f64 {
    let (a, b) = (a as i64, b as i64);
    (a - b).abs() as f64 / 2.0 + a.min(b) as f64
}
