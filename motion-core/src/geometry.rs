//! Plain 2-D geometry used by the entity model and the render backends.
//!
//! Coordinates follow the canvas convention: origin top-left, y grows
//! downward, units are canvas pixels unless a type says otherwise.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

// ───────────────────────────────────────────────────────────────────
// Point / Size
// ───────────────────────────────────────────────────────────────────

/// A point (or vector) in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline(always)]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    /// Length of this point treated as a vector.
    #[inline]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline(always)]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline(always)]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width/height pair in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    #[inline(always)]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// `true` when either side is zero, negative or NaN.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

// ───────────────────────────────────────────────────────────────────
// Aabb — Axis-Aligned Bounding Box
// ───────────────────────────────────────────────────────────────────

/// AABB stored as min/max corners.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    /// Smallest box enclosing all `points`.  Empty input yields a box
    /// whose min is greater than its max.
    pub fn from_points(points: &[Point]) -> Self {
        let mut aabb = Aabb {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        };
        for p in points {
            aabb.min_x = aabb.min_x.min(p.x);
            aabb.min_y = aabb.min_y.min(p.y);
            aabb.max_x = aabb.max_x.max(p.x);
            aabb.max_y = aabb.max_y.max(p.y);
        }
        aabb
    }
}

// ───────────────────────────────────────────────────────────────────
// Quad
// ───────────────────────────────────────────────────────────────────

/// Four corners of a transformed rectangle, in drawing order
/// (top-left, top-right, bottom-right, bottom-left of the local rect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    /// Project the local rect `[0, w] × [0, h]` through `m`.
    pub fn from_local(size: Size, m: &Affine) -> Self {
        Self {
            corners: [
                m.apply(Point::new(0.0, 0.0)),
                m.apply(Point::new(size.width, 0.0)),
                m.apply(Point::new(size.width, size.height)),
                m.apply(Point::new(0.0, size.height)),
            ],
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.corners)
    }

    /// Signed area (shoelace).  Negative for mirrored quads.
    pub fn signed_area(&self) -> f32 {
        let c = &self.corners;
        let mut acc = 0.0;
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            acc += a.x * b.y - b.x * a.y;
        }
        acc * 0.5
    }

    /// Point-in-convex-quad test, edges inclusive.  Works for either
    /// winding; degenerate quads contain nothing.
    pub fn contains(&self, p: Point) -> bool {
        if self.signed_area().abs() <= f32::EPSILON {
            return false;
        }
        let mut positive = false;
        let mut negative = false;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            if cross > 0.0 {
                positive = true;
            } else if cross < 0.0 {
                negative = true;
            }
            if positive && negative {
                return false;
            }
        }
        true
    }
}

// ───────────────────────────────────────────────────────────────────
// Affine
// ───────────────────────────────────────────────────────────────────

/// 2-D affine matrix `[a, b, c, d, e, f]`:
///
/// ```text
/// x' = a·x + c·y + e
/// y' = b·x + d·y + f
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine(pub [f32; 6]);

impl Affine {
    pub const IDENTITY: Affine = Affine([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    #[inline]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Affine([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Affine([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Rotation by `radians`; positive is clockwise on a y-down canvas.
    #[inline]
    pub fn rotate(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Affine([c, s, -s, c, 0.0, 0.0])
    }

    /// Apply `self` first, then `next`.
    #[inline]
    pub fn then(self, next: Affine) -> Affine {
        next * self
    }

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        let [a, b, c, d, _, _] = self.0;
        a * d - b * c
    }

    /// Inverse matrix, or `None` for singular matrices.
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let [a, b, c, d, e, f] = self.0;
        Some(Affine([
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * f - d * e) * inv,
            (b * e - a * f) * inv,
        ]))
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Affine {
    type Output = Affine;

    /// `self * rhs` applies `rhs` first.
    fn mul(self, rhs: Affine) -> Affine {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = rhs.0;
        Affine([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ])
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_affine_compose_order() {
        // scale then translate
        let m = Affine::scale(2.0, 2.0).then(Affine::translate(10.0, 0.0));
        assert!(approx(m.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0)));
    }

    #[test]
    fn test_affine_rotate_quarter_turn() {
        let m = Affine::rotate(FRAC_PI_2);
        // x axis maps onto +y on a y-down canvas.
        assert!(approx(m.apply(Point::new(1.0, 0.0)), Point::new(0.0, 1.0)));
    }

    #[test]
    fn test_affine_inverse() {
        let m = Affine::scale(-1.5, 1.5)
            .then(Affine::rotate(0.7))
            .then(Affine::translate(30.0, -4.0));
        let inv = m.inverse().unwrap();
        let p = Point::new(3.0, 9.0);
        assert!(approx(inv.apply(m.apply(p)), p));
    }

    #[test]
    fn test_affine_singular_has_no_inverse() {
        assert!(Affine::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_quad_contains_axis_aligned() {
        let q = Quad::from_local(Size::new(10.0, 5.0), &Affine::translate(1.0, 1.0));
        assert!(q.contains(Point::new(5.0, 3.0)));
        assert!(q.contains(Point::new(1.0, 1.0)));
        assert!(!q.contains(Point::new(0.0, 0.0)));
        assert!(!q.contains(Point::new(12.0, 3.0)));
    }

    #[test]
    fn test_quad_contains_mirrored() {
        let q = Quad::from_local(Size::new(10.0, 10.0), &Affine::scale(-1.0, 1.0));
        assert!(q.signed_area() < 0.0);
        assert!(q.contains(Point::new(-5.0, 5.0)));
        assert!(!q.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_quad_degenerate_contains_nothing() {
        let q = Quad::from_local(Size::new(0.0, 10.0), &Affine::IDENTITY);
        assert!(!q.contains(Point::new(0.0, 5.0)));
    }

    #[test]
    fn test_aabb_from_points() {
        let b = Aabb::from_points(&[Point::new(3.0, -1.0), Point::new(-2.0, 4.0)]);
        assert_eq!(
            b,
            Aabb {
                min_x: -2.0,
                min_y: -1.0,
                max_x: 3.0,
                max_y: 4.0,
            }
        );
        let empty = Aabb::from_points(&[]);
        assert!(empty.min_x > empty.max_x && empty.min_y > empty.max_y);
    }

    #[test]
    fn test_size_is_empty() {
        assert!(Size::ZERO.is_empty());
        assert!(Size::new(f32::NAN, 1.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }
}
