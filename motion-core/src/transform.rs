//! Normalised-centre transform for canvas entities.
//!
//! The centre is stored as a fraction of the canvas size so the canvas can
//! be resized without re-laying-out entities.  Projection from layer-local
//! pixels to canvas pixels composes, in order:
//!
//! ```text
//! local ──▸ centre on origin ──▸ flip ──▸ scale ──▸ rotate ──▸ translate to (cx·W, cy·H)
//! ```

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::error::CompositorError;
use crate::geometry::{Affine, Point, Size};

/// Bounds enforced on [`Transform::scale`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformLimits {
    pub scale_min: f32,
    pub scale_max: f32,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            scale_min: 0.1,
            scale_max: 10.0,
        }
    }
}

impl TransformLimits {
    #[inline]
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.scale_min, self.scale_max)
    }

    #[inline]
    pub fn contains_scale(&self, scale: f32) -> bool {
        scale >= self.scale_min && scale <= self.scale_max
    }
}

/// Which axes a translation actually moved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisMoves {
    pub x: bool,
    pub y: bool,
}

impl AxisMoves {
    #[inline]
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Position, scale, rotation and mirroring of one layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Normalised centre x in `[0, 1]`.
    pub cx: f32,
    /// Normalised centre y in `[0, 1]`.
    pub cy: f32,
    pub scale: f32,
    /// Rotation in `(-π, π]`.
    pub rotation: f32,
    /// Mirrored along the layer's local vertical axis.
    pub flipped: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            cx: 0.5,
            cy: 0.5,
            scale: 1.0,
            rotation: 0.0,
            flipped: false,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────── mutation ─────────────────────

    /// Add a normalised delta to the centre.
    ///
    /// Each axis is handled on its own and clamped to `[0, 1]`, so a
    /// diagonal drag into a wall keeps sliding along the free axis.  An
    /// axis that is already saturated in the drag direction does not move.
    pub fn post_translate(&mut self, dx: f32, dy: f32) -> AxisMoves {
        let mut moves = AxisMoves::default();
        if dx.is_finite() {
            let next = (self.cx + dx).clamp(0.0, 1.0);
            moves.x = next != self.cx;
            self.cx = next;
        }
        if dy.is_finite() {
            let next = (self.cy + dy).clamp(0.0, 1.0);
            moves.y = next != self.cy;
            self.cy = next;
        }
        moves
    }

    /// Multiply the scale by `1 + delta`, clamped to `limits`.
    ///
    /// A non-positive or non-finite resulting factor is ignored and
    /// returns `false`.
    pub fn post_scale(&mut self, delta: f32, limits: &TransformLimits) -> bool {
        let factor = 1.0 + delta;
        if !(factor.is_finite() && factor > 0.0) {
            return false;
        }
        let next = limits.clamp_scale(self.scale * factor);
        let changed = next != self.scale;
        self.scale = next;
        changed
    }

    /// Set the scale exactly.  Out-of-range values are rejected.
    pub fn set_scale(&mut self, scale: f32, limits: &TransformLimits) -> Result<(), CompositorError> {
        if !limits.contains_scale(scale) {
            return Err(CompositorError::ScaleOutOfRange {
                scale,
                min: limits.scale_min,
                max: limits.scale_max,
            });
        }
        self.scale = scale;
        Ok(())
    }

    pub fn post_rotate(&mut self, radians: f32) {
        if radians.is_finite() {
            self.rotation = normalize_angle(self.rotation + radians);
        }
    }

    #[inline]
    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn move_to_center(&mut self) {
        self.cx = 0.5;
        self.cy = 0.5;
    }

    /// Clamp the centre into `[0, 1]` and reduce the rotation into
    /// `(-π, π]`.  Non-finite components fall back to their defaults.
    /// Returns `true` if anything changed.  Scale is left to the caller,
    /// which rejects rather than clamps it.
    pub fn normalize(&mut self) -> bool {
        let before = *self;
        self.cx = if self.cx.is_finite() { self.cx.clamp(0.0, 1.0) } else { 0.5 };
        self.cy = if self.cy.is_finite() { self.cy.clamp(0.0, 1.0) } else { 0.5 };
        self.rotation = if self.rotation.is_finite() {
            normalize_angle(self.rotation)
        } else {
            0.0
        };
        *self != before
    }

    // ───────────────────── projection ─────────────────────

    /// Local-to-canvas matrix for a layer of `local` size on a canvas of
    /// `canvas` size.
    pub fn matrix(&self, local: Size, canvas: Size) -> Affine {
        let sx = if self.flipped { -self.scale } else { self.scale };
        Affine::translate(-local.width * 0.5, -local.height * 0.5)
            .then(Affine::scale(sx, self.scale))
            .then(Affine::rotate(self.rotation))
            .then(Affine::translate(self.cx * canvas.width, self.cy * canvas.height))
    }

    /// Project a layer-local point onto the canvas.
    #[inline]
    pub fn project_point(&self, p: Point, local: Size, canvas: Size) -> Point {
        self.matrix(local, canvas).apply(p)
    }

    /// Centre in canvas pixels.
    #[inline]
    pub fn absolute_center(&self, canvas: Size) -> Point {
        Point::new(self.cx * canvas.width, self.cy * canvas.height)
    }
}

/// Reduce an angle to `(-π, π]`.
pub fn normalize_angle(radians: f32) -> f32 {
    let mut a = radians % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const CANVAS: Size = Size::new(200.0, 100.0);
    const LOCAL: Size = Size::new(40.0, 20.0);

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_default_is_centered_identity() {
        let t = Transform::default();
        assert_eq!(t.absolute_center(CANVAS), Point::new(100.0, 50.0));
        assert_eq!(t.scale, 1.0);
        assert!(!t.flipped);
    }

    #[test]
    fn test_translate_clamps_each_axis() {
        let mut t = Transform::default();
        let moves = t.post_translate(1.5, 0.1);
        assert_eq!(t.cx, 1.0);
        assert!(close(t.cy, 0.6));
        assert!(moves.x && moves.y);

        // Saturated x, free y: slide along the wall.
        let moves = t.post_translate(0.05, 0.1);
        assert!(!moves.x);
        assert!(moves.y);
        assert_eq!(t.cx, 1.0);
        assert!(close(t.cy, 0.7));
    }

    #[test]
    fn test_translate_ignores_nan() {
        let mut t = Transform::default();
        let moves = t.post_translate(f32::NAN, f32::INFINITY);
        assert!(!moves.any());
        assert_eq!(t.cx, 0.5);
        assert_eq!(t.cy, 0.5);
    }

    #[test]
    fn test_post_scale_multiplies_and_clamps() {
        let limits = TransformLimits::default();
        let mut t = Transform::default();
        assert!(t.post_scale(1.0, &limits));
        assert_eq!(t.scale, 2.0);
        t.post_scale(100.0, &limits);
        assert_eq!(t.scale, 10.0);
        t.post_scale(-0.999, &limits);
        assert_eq!(t.scale, 0.1);
    }

    #[test]
    fn test_post_scale_rejects_non_positive_factor() {
        let limits = TransformLimits::default();
        let mut t = Transform::default();
        assert!(!t.post_scale(-1.0, &limits));
        assert!(!t.post_scale(-3.0, &limits));
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn test_set_scale_out_of_range() {
        let limits = TransformLimits::default();
        let mut t = Transform::default();
        assert!(t.set_scale(0.05, &limits).is_err());
        assert!(t.set_scale(3.0, &limits).is_ok());
        assert_eq!(t.scale, 3.0);
    }

    #[test]
    fn test_rotation_normalised() {
        let mut t = Transform::default();
        t.post_rotate(PI);
        assert!(close(t.rotation, PI));
        t.post_rotate(FRAC_PI_2);
        assert!(close(t.rotation, -FRAC_PI_2));
        t.post_rotate(-PI);
        assert!(close(t.rotation, FRAC_PI_2));
    }

    #[test]
    fn test_normalize_angle_range() {
        for i in -40..40 {
            let a = normalize_angle(i as f32 * 0.7);
            assert!(a > -PI - 1e-5 && a <= PI + 1e-5, "{a} out of range");
        }
        assert!(close(normalize_angle(-PI), PI));
    }

    #[test]
    fn test_project_corners_identity() {
        let t = Transform::default();
        let tl = t.project_point(Point::ZERO, LOCAL, CANVAS);
        let br = t.project_point(Point::new(40.0, 20.0), LOCAL, CANVAS);
        assert_eq!(tl, Point::new(80.0, 40.0));
        assert_eq!(br, Point::new(120.0, 60.0));
    }

    #[test]
    fn test_project_flip_then_scale() {
        let mut t = Transform::default();
        t.flip();
        t.scale = 2.0;
        // Local top-left lands on the right after mirroring.
        let tl = t.project_point(Point::ZERO, LOCAL, CANVAS);
        assert!(close(tl.x, 140.0));
        assert!(close(tl.y, 30.0));
    }

    #[test]
    fn test_project_rotate_quarter_turn() {
        let mut t = Transform::default();
        t.post_rotate(FRAC_PI_2);
        let tl = t.project_point(Point::ZERO, LOCAL, CANVAS);
        // (-20, -10) rotated by +90° is (10, -20).
        assert!(close(tl.x, 110.0));
        assert!(close(tl.y, 30.0));
    }

    #[test]
    fn test_normalize_pulls_into_range() {
        let mut t = Transform {
            cx: 7.5,
            cy: -3.0,
            scale: 2.0,
            rotation: 20.0,
            flipped: true,
        };
        assert!(t.normalize());
        assert_eq!((t.cx, t.cy), (1.0, 0.0));
        assert!(t.rotation > -PI && t.rotation <= PI);
        assert!(close(t.rotation, 20.0 - 3.0 * TAU));
        assert_eq!(t.scale, 2.0);
        assert!(t.flipped);
        assert!(!t.normalize());
    }

    #[test]
    fn test_normalize_non_finite_falls_back() {
        let mut t = Transform {
            cx: f32::NAN,
            cy: f32::INFINITY,
            rotation: f32::NAN,
            ..Transform::default()
        };
        assert!(t.normalize());
        assert_eq!(t, Transform::default());
    }

    #[test]
    fn test_double_flip_restores_matrix() {
        let mut t = Transform::default();
        let before = t.matrix(LOCAL, CANVAS);
        t.flip();
        t.flip();
        assert_eq!(t.matrix(LOCAL, CANVAS), before);
    }
}
