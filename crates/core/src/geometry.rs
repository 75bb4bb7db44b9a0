//! Geometric primitives shared by every coordinate space.
//!
//! Provides:
//! - `BBox`, the axis-aligned rectangle attached to text blocks, cells and tables
//! - the `HasBBox` trait for anything that carries one
//! - polygon validation and polygon → (bbox, rotation) reduction for OCR quads

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnifexError};

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// Number of corners in an OCR detection quadrilateral.
pub const POLYGON_POINTS: usize = 4;

/// Number of coordinates per polygon point.
pub const COORDINATES_PER_POINT: usize = 2;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A quadrilateral as reported by OCR engines, corners in drawing order.
pub type Polygon = [Point; POLYGON_POINTS];

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// An axis-aligned bounding box (x0, y0, x1, y1).
///
/// The unit is whatever the enclosing page declares. Every box handed out by
/// this crate satisfies `x1 >= x0` and `y1 >= y0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    /// Creates a bounding box, rejecting inverted or non-finite coordinates.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return Err(UnifexError::InvalidGeometry(format!(
                "bbox coordinates must be finite, got ({x0}, {y0}, {x1}, {y1})"
            )));
        }
        if x1 < x0 || y1 < y0 {
            return Err(UnifexError::InvalidGeometry(format!(
                "bbox is inverted: ({x0}, {y0}, {x1}, {y1})"
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// Builds the box spanned by two arbitrary opposite corners.
    ///
    /// Unlike [`BBox::new`] this never fails on ordering: the corners are
    /// reordered so that the result satisfies the min/max invariant.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Union of every box in the iterator, or `None` when it is empty.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<BBox> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(u) => Some(u.union(b)),
                None => Some(*b),
            })
    }

    /// True when the horizontal extents touch or overlap.
    pub fn overlaps_horizontally(&self, other: &BBox) -> bool {
        !(self.x1 < other.x0 || self.x0 > other.x1)
    }

    /// Approximate equality on all four coordinates.
    pub fn approx_eq(&self, other: &BBox, epsilon: f64) -> bool {
        approx_eq(self.x0, other.x0, epsilon)
            && approx_eq(self.y0, other.y0, epsilon)
            && approx_eq(self.x1, other.x1, epsilon)
            && approx_eq(self.y1, other.y1, epsilon)
    }
}

/// Trait for objects that have a bounding box.
pub trait HasBBox {
    fn bbox(&self) -> &BBox;

    fn x0(&self) -> f64 {
        self.bbox().x0
    }
    fn y0(&self) -> f64 {
        self.bbox().y0
    }
    fn x1(&self) -> f64 {
        self.bbox().x1
    }
    fn y1(&self) -> f64 {
        self.bbox().y1
    }
}

impl HasBBox for BBox {
    fn bbox(&self) -> &BBox {
        self
    }
}

/// Validates raw polygon points into a fixed 4-corner polygon.
///
/// OCR engines hand polygons over as nested lists; anything other than four
/// points of exactly two coordinates is rejected rather than coerced.
pub fn polygon_from_points<P: AsRef<[f64]>>(points: &[P]) -> Result<Polygon> {
    if points.len() != POLYGON_POINTS {
        return Err(UnifexError::InvalidGeometry(format!(
            "polygon must have {POLYGON_POINTS} points, got {}",
            points.len()
        )));
    }

    let mut polygon = [(0.0, 0.0); POLYGON_POINTS];
    for (slot, point) in polygon.iter_mut().zip(points) {
        let coords = point.as_ref();
        if coords.len() != COORDINATES_PER_POINT {
            return Err(UnifexError::InvalidGeometry(format!(
                "each point must have {COORDINATES_PER_POINT} coordinates, got {}",
                coords.len()
            )));
        }
        *slot = (coords[0], coords[1]);
    }
    Ok(polygon)
}

/// Reduces a quadrilateral to its enclosing bbox and its rotation.
///
/// The rotation is the angle of the first edge (p0 → p1) from horizontal in
/// degrees; an axis-aligned quad yields 0.
pub fn polygon_to_bbox_and_rotation(polygon: &Polygon) -> (BBox, f64) {
    let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
    let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in polygon {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }

    let (px, py) = polygon[0];
    let (qx, qy) = polygon[1];
    let rotation = (qy - py).atan2(qx - px).to_degrees();

    (BBox { x0, y0, x1, y1 }, rotation)
}
