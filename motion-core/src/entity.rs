//! A composable object on the canvas: content, selection flag, border
//! style and the surface resources cached for it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::CompositorError;
use crate::geometry::{Affine, Point, Quad, Size};
use crate::layer::{EntityContent, TextLayer};
use crate::surface::{BorderStyle, OverlayStyle, RenderSurface, ResourceSlot};
use crate::transform::Transform;

/// Stable identity of an entity in the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Content plus the state the compositor tracks for it.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    content: EntityContent,
    selected: bool,
    border_style: Option<BorderStyle>,
    resources: ResourceSlot,
}

impl Entity {
    pub fn new(content: impl Into<EntityContent>) -> Self {
        Self::with_id(EntityId::new(), content)
    }

    /// Build an entity with a caller-chosen id (e.g. when restoring a
    /// composition).
    pub fn with_id(id: EntityId, content: impl Into<EntityContent>) -> Self {
        Self {
            id,
            content: content.into(),
            selected: false,
            border_style: None,
            resources: ResourceSlot::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn content(&self) -> &EntityContent {
        &self.content
    }

    /// The text payload, if this is a text entity.
    pub fn text_layer(&self) -> Option<&TextLayer> {
        self.content.as_text()
    }

    pub(crate) fn text_layer_mut(&mut self) -> Option<&mut TextLayer> {
        self.content.as_text_mut()
    }

    pub fn transform(&self) -> &Transform {
        self.content.transform()
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        self.content.transform_mut()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn border_style(&self) -> Option<&BorderStyle> {
        self.border_style.as_ref()
    }

    pub fn set_border_style(&mut self, border: Option<BorderStyle>) {
        self.border_style = border;
    }

    pub fn resources(&self) -> &ResourceSlot {
        &self.resources
    }

    // ───────────────────── geometry ─────────────────────

    /// Unscaled local size.
    pub fn local_size(&self) -> Size {
        self.content.local_bounds()
    }

    /// Local-to-canvas matrix.
    pub fn matrix(&self, canvas: Size) -> Affine {
        self.transform().matrix(self.local_size(), canvas)
    }

    /// The four transformed corners of the entity on the canvas.
    pub fn quad(&self, canvas: Size) -> Quad {
        Quad::from_local(self.local_size(), &self.matrix(canvas))
    }

    /// `true` iff `p` lies inside the transformed bounding quad.
    ///
    /// Maps `p` back through the inverse transform and tests it against
    /// `[0, w] × [0, h]`.  Zero-area layers contain nothing.
    pub fn point_in_layer_rect(&self, p: Point, canvas: Size) -> bool {
        let size = self.local_size();
        if size.is_empty() {
            return false;
        }
        let Some(inverse) = self.matrix(canvas).inverse() else {
            return false;
        };
        let local = inverse.apply(p);
        local.x >= 0.0 && local.x <= size.width && local.y >= 0.0 && local.y <= size.height
    }

    /// Centre in canvas pixels.
    pub fn absolute_center(&self, canvas: Size) -> Point {
        self.transform().absolute_center(canvas)
    }

    pub fn move_to_canvas_center(&mut self) {
        self.transform_mut().move_to_center();
    }

    // ───────────────────── surface ─────────────────────

    /// Refresh the unscaled size and drop cached resources built for the
    /// previous measurement.
    pub fn measure<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> Size {
        self.resources.invalidate();
        self.content.measure(surface)
    }

    /// Draw under the current transform.  With `overlay`, additionally wash
    /// the bounding quad and outline it with the border style, if any.
    pub fn draw<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        canvas: Size,
        overlay: Option<&OverlayStyle>,
    ) {
        let matrix = self.matrix(canvas);
        surface.push_transform(matrix);
        self.content.draw(surface, &mut self.resources);
        surface.pop_transform();

        if let Some(overlay) = overlay {
            let quad = Quad::from_local(self.local_size(), &matrix);
            surface.fill_quad(&quad, overlay.fill);
            if let Some(border) = &self.border_style {
                surface.stroke_quad(&quad, border);
            }
        }
    }

    /// Release surface-bound resources.  A second call is a programmer
    /// error and leaves the entity untouched.
    pub fn release(&mut self) -> Result<(), CompositorError> {
        if self.resources.release() {
            Ok(())
        } else {
            log::warn!("Entity {}: release called twice", self.id);
            Err(CompositorError::DoubleRelease(self.id))
        }
    }

    pub fn is_released(&self) -> bool {
        self.resources.is_released()
    }
}

// ===================================================================
// Tests
// ===================================================================
