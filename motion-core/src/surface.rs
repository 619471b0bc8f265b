//! Drawing backend contract.
//!
//! The compositor never touches pixels.  It measures, pushes transforms,
//! draws text and fills quads through [`RenderSurface`]; the reference CPU
//! implementation lives in `motion-render`.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

use crate::error::CompositorError;
use crate::geometry::{Affine, Quad, Size};
use crate::layer::{Color, TextLayer, TextStyle};

/// Outline painted around the selected entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderStyle {
    pub color: Color,
    /// Stroke width in canvas pixels.
    pub width: f32,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(66, 133, 245),
            width: 2.0,
        }
    }
}

/// Translucent wash painted over an entity's bounding quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub fill: Color,
}

/// Operations the compositor needs from a drawing backend.
pub trait RenderSurface {
    /// Pixel size of the surface.
    fn size(&self) -> Size;

    /// Unscaled size of `text` rendered with `style`.
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> Size;

    /// Push `m` on the transform stack.  Subsequent draws map layer-local
    /// coordinates through the product of all pushed matrices.
    fn push_transform(&mut self, m: Affine);

    fn pop_transform(&mut self);

    /// Draw `layer` with its local rect `[0, w] × [0, h]` at the current
    /// transform.  `slot` belongs to the drawing entity and may hold any
    /// backend cache (glyph masks, textures) until the entity is released.
    fn draw_text(&mut self, layer: &TextLayer, slot: &mut ResourceSlot);

    /// Fill a quad given in surface pixels.
    fn fill_quad(&mut self, quad: &Quad, color: Color);

    /// Outline a quad given in surface pixels.
    fn stroke_quad(&mut self, quad: &Quad, border: &BorderStyle);

    /// Overwrite every pixel with `color`.
    fn clear(&mut self, color: Color);

    /// Allocate a compatible offscreen surface.
    fn create_offscreen(&self, width: u32, height: u32) -> Result<Self, CompositorError>
    where
        Self: Sized;
}

// ── ResourceSlot ────────────────────────────────────────────────────

/// Per-entity storage for surface-bound resources.
///
/// Backends stash whatever they cache for an entity here.  Releasing the
/// slot drops the resource and refuses further inserts.
#[derive(Default)]
pub struct ResourceSlot {
    resource: Option<Box<dyn Any>>,
    released: bool,
}

impl ResourceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the stored resource if it has type `T`.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.resource.as_ref().and_then(|r| r.downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resource.as_mut().and_then(|r| r.downcast_mut::<T>())
    }

    /// Store `value`, replacing any previous resource.  Ignored once the
    /// slot has been released.
    pub fn insert<T: 'static>(&mut self, value: T) {
        if self.released {
            log::warn!("ResourceSlot: insert after release ignored");
            return;
        }
        self.resource = Some(Box::new(value));
    }

    /// Drop the cached resource without releasing the slot.
    pub fn invalidate(&mut self) {
        self.resource = None;
    }

    pub fn is_occupied(&self) -> bool {
        self.resource.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Drop the resource for good.  Returns `false` if already released.
    pub(crate) fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.resource = None;
        self.released = true;
        true
    }
}

impl fmt::Debug for ResourceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSlot")
            .field("occupied", &self.is_occupied())
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_typed_access() {
        let mut slot = ResourceSlot::new();
        assert!(slot.get::<u32>().is_none());
        slot.insert(7u32);
        assert_eq!(slot.get::<u32>(), Some(&7));
        assert!(slot.get::<String>().is_none());
        *slot.get_mut::<u32>().unwrap() += 1;
        assert_eq!(slot.get::<u32>(), Some(&8));
    }

    #[test]
    fn test_slot_release_once() {
        let mut slot = ResourceSlot::new();
        slot.insert(vec![1u8, 2, 3]);
        assert!(slot.release());
        assert!(!slot.is_occupied());
        assert!(!slot.release());
        slot.insert(1u8);
        assert!(!slot.is_occupied());
    }

    #[test]
    fn test_slot_invalidate_keeps_slot_usable() {
        let mut slot = ResourceSlot::new();
        slot.insert(1u8);
        slot.invalidate();
        assert!(!slot.is_occupied());
        slot.insert(2u8);
        assert_eq!(slot.get::<u8>(), Some(&2));
    }
}
