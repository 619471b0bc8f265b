//! Compositor — the single source of truth for the overlay editor.
//!
//! Owns the z-ordered entity stack and the selection.  Every command the
//! gesture layer issues lands here; drawing and snapshots are delegated to
//! a [`RenderSurface`].
//!
//! # Stack order
//!
//! * Drawing is ascending: `entities[0]` is backmost.
//! * Hit testing is descending: the last entity is frontmost and wins.
//!
//! # Selection
//!
//! ```text
//!            select(e)
//!   NONE ───────────────▶ SELECTED(e)
//!     ▲                         │  select(e')
//!     │ unselect / delete       ├───────────▶ SELECTED(e')
//!     └─────────────────────────┘
//! ```
//!
//! At most one entity is selected.  The selected entity is drawn twice
//! per frame: once in stack order, once more on top with the selection
//! wash and border.

use rustc_hash::FxHashSet;

use crate::config::CompositorConfig;
use crate::entity::{Entity, EntityId};
use crate::error::CompositorError;
use crate::geometry::{Point, Size};
use crate::layer::TextStyle;
use crate::surface::RenderSurface;
use crate::transform::AxisMoves;

/// Notifications produced by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositorEvent {
    /// Selection changed; `None` means cleared.
    Selected(Option<EntityId>),
    /// Double tap while `EntityId` was selected.
    DoubleTap(EntityId),
}

type Listener = Box<dyn FnMut(&CompositorEvent)>;

/// Ordered stack of entities plus selection.
pub struct Compositor {
    canvas: Size,
    config: CompositorConfig,
    entities: Vec<Entity>,
    /// Membership index guarding against double insertion.
    ids: FxHashSet<EntityId>,
    selected: Option<EntityId>,
    listeners: Vec<Listener>,
}

impl Compositor {
    pub fn new(canvas: Size) -> Self {
        Self::with_config(canvas, CompositorConfig::default())
    }

    pub fn with_config(canvas: Size, config: CompositorConfig) -> Self {
        Self {
            canvas,
            config,
            entities: Vec::new(),
            ids: FxHashSet::default(),
            selected: None,
            listeners: Vec::new(),
        }
    }

    // ---------------------------------------------------------------
    // Canvas / config / observers
    // ---------------------------------------------------------------

    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    /// Resize the canvas.  Normalised centres are kept, so entities keep
    /// their relative placement.
    pub fn set_canvas_size(&mut self, canvas: Size) {
        log::debug!(
            "Compositor: canvas {}×{} → {}×{}",
            self.canvas.width,
            self.canvas.height,
            canvas.width,
            canvas.height
        );
        self.canvas = canvas;
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Register an observer for [`CompositorEvent`]s.  Observers are called
    /// in registration order.
    pub fn subscribe(&mut self, listener: impl FnMut(&CompositorEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: CompositorEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Entities in drawing order (back to front).
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Stack position of `id` (0 = backmost).
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == id)
    }

    /// Ids in drawing order.
    pub fn stack_order(&self) -> Vec<EntityId> {
        self.entities.iter().map(Entity::id).collect()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn selected_entity(&self) -> Option<&Entity> {
        self.selected.and_then(|id| self.entity(id))
    }

    fn selected_entity_mut(&mut self) -> Option<&mut Entity> {
        let id = self.selected?;
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ---------------------------------------------------------------
    // Insertion
    // ---------------------------------------------------------------

    fn check_absent(&self, id: EntityId) -> Result<(), CompositorError> {
        if self.ids.contains(&id) {
            log::warn!("Compositor: rejected duplicate entity {id}");
            return Err(CompositorError::DuplicateEntity(id));
        }
        Ok(())
    }

    fn push(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        self.ids.insert(id);
        self.entities.push(entity);
        id
    }

    /// Measure `entity` and put it on top of the stack.  Neither places
    /// nor selects it.
    ///
    /// A scale outside the configured limits is rejected.  The centre is
    /// clamped onto the canvas and the rotation reduced into `(-π, π]`.
    pub fn add<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        mut entity: Entity,
    ) -> Result<EntityId, CompositorError> {
        self.check_absent(entity.id())?;
        let limits = self.config.limits;
        let scale = entity.transform().scale;
        if !limits.contains_scale(scale) {
            log::warn!("Compositor: rejected {} with scale {scale}", entity.id());
            return Err(CompositorError::ScaleOutOfRange {
                scale,
                min: limits.scale_min,
                max: limits.scale_max,
            });
        }
        if entity.transform_mut().normalize() {
            log::debug!("Compositor: normalised transform of {}", entity.id());
        }
        entity.measure(surface);
        let id = self.push(entity);
        log::debug!("Compositor: added {id} at index {}", self.entities.len() - 1);
        Ok(id)
    }

    /// Measure `entity`, centre it at its initial scale, put it on top and
    /// select it (notifying observers).
    pub fn add_and_place<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        mut entity: Entity,
    ) -> Result<EntityId, CompositorError> {
        self.check_absent(entity.id())?;
        entity.measure(surface);
        entity.move_to_canvas_center();
        entity.transform_mut().normalize();
        let scale = entity.content().initial_scale(
            self.canvas.width,
            self.config.initial_fit_ratio,
            &self.config.limits,
        );
        entity.transform_mut().scale = scale;
        entity.set_border_style(Some(self.config.border));
        let id = self.push(entity);
        log::debug!("Compositor: placed {id} at scale {scale}");
        self.select(Some(id), true)?;
        Ok(id)
    }

    // ---------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------

    /// Change the selection.  No-op when `id` is already selected.
    pub fn select(&mut self, id: Option<EntityId>, notify: bool) -> Result<(), CompositorError> {
        if let Some(id) = id {
            if !self.ids.contains(&id) {
                log::warn!("Compositor: select of unknown entity {id}");
                return Err(CompositorError::EntityNotFound(id));
            }
        }
        if id == self.selected {
            return Ok(());
        }

        if let Some(prev) = self.selected_entity_mut() {
            prev.set_selected(false);
        }
        self.selected = id;
        if let Some(next) = self.selected_entity_mut() {
            next.set_selected(true);
        }
        log::debug!("Compositor: selection → {id:?}");

        if notify {
            self.emit(CompositorEvent::Selected(id));
        }
        Ok(())
    }

    /// Clear the selection, notifying observers.  No-op if nothing is
    /// selected.
    pub fn unselect(&mut self) {
        if self.selected.is_some() {
            self.clear_selection(true);
        }
    }

    fn clear_selection(&mut self, notify: bool) {
        // Selecting `None` cannot fail.
        let _ = self.select(None, notify);
    }

    // ---------------------------------------------------------------
    // Hit testing / taps
    // ---------------------------------------------------------------

    /// Frontmost entity whose transformed bounds contain `p`.
    pub fn hit_test(&self, p: Point) -> Option<EntityId> {
        self.entities
            .iter()
            .rev()
            .find(|e| e.point_in_layer_rect(p, self.canvas))
            .map(Entity::id)
    }

    /// Select whatever is under `p`; a miss clears the selection.
    pub fn tap(&mut self, p: Point) {
        let hit = self.hit_test(p);
        log::trace!("Compositor: tap at ({}, {}) → {hit:?}", p.x, p.y);
        self.clear_or_select(hit);
    }

    fn clear_or_select(&mut self, hit: Option<EntityId>) {
        // `hit` came from the stack, so this cannot fail.
        let _ = self.select(hit, true);
    }

    /// Report a double tap on the selected entity.  Never mutates state.
    pub fn double_tap(&mut self) -> bool {
        match self.selected {
            Some(id) => {
                self.emit(CompositorEvent::DoubleTap(id));
                true
            }
            None => false,
        }
    }

    /// Promote the selected entity to the front when `p` lies inside it.
    ///
    /// Only the *selected* entity is considered, not whatever is topmost
    /// under the finger.
    pub fn long_press(&mut self, p: Point) -> bool {
        let inside = self
            .selected_entity()
            .is_some_and(|e| e.point_in_layer_rect(p, self.canvas));
        inside && self.bring_selected_to_front()
    }

    // ---------------------------------------------------------------
    // Transform commands (all no-ops without a selection)
    // ---------------------------------------------------------------

    /// Move the selected entity by a pixel delta.  Each axis is clamped
    /// independently so the centre stays on the canvas.
    pub fn translate_selected(&mut self, dx: f32, dy: f32) -> AxisMoves {
        let canvas = self.canvas;
        if canvas.is_empty() {
            return AxisMoves::default();
        }
        match self.selected_entity_mut() {
            Some(e) => e
                .transform_mut()
                .post_translate(dx / canvas.width, dy / canvas.height),
            None => AxisMoves::default(),
        }
    }

    /// Multiply the selected entity's scale by `factor`, clamped to the
    /// configured limits.  Non-positive factors are ignored.
    pub fn scale_selected(&mut self, factor: f32) -> bool {
        let limits = self.config.limits;
        self.selected_entity_mut()
            .is_some_and(|e| e.transform_mut().post_scale(factor - 1.0, &limits))
    }

    /// Set the selected entity's scale exactly.  Returns `Ok(false)` when
    /// nothing is selected.
    pub fn set_selected_scale(&mut self, scale: f32) -> Result<bool, CompositorError> {
        let limits = self.config.limits;
        match self.selected_entity_mut() {
            Some(e) => e.transform_mut().set_scale(scale, &limits).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn rotate_selected(&mut self, radians: f32) -> bool {
        match self.selected_entity_mut() {
            Some(e) => {
                e.transform_mut().post_rotate(radians);
                true
            }
            None => false,
        }
    }

    pub fn flip_selected(&mut self) -> bool {
        match self.selected_entity_mut() {
            Some(e) => {
                e.transform_mut().flip();
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------
    // Content edits
    // ---------------------------------------------------------------

    /// Replace the selected layer's text and re-measure it.
    pub fn set_selected_text<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        text: &str,
    ) -> bool {
        self.edit_selected_text(surface, |layer| layer.set_text(text))
    }

    /// Replace the selected layer's style and re-measure it.
    pub fn set_selected_style<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        style: TextStyle,
    ) -> bool {
        self.edit_selected_text(surface, |layer| layer.set_style(style))
    }

    fn edit_selected_text<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        edit: impl FnOnce(&mut crate::layer::TextLayer),
    ) -> bool {
        let Some(entity) = self.selected_entity_mut() else {
            return false;
        };
        let Some(layer) = entity.text_layer_mut() else {
            return false;
        };
        edit(layer);
        entity.measure(surface);
        true
    }

    // ---------------------------------------------------------------
    // Z-order
    // ---------------------------------------------------------------

    /// Move the selected entity to the top of the stack.
    pub fn bring_selected_to_front(&mut self) -> bool {
        let Some(index) = self.selected.and_then(|id| self.index_of(id)) else {
            return false;
        };
        if index + 1 != self.entities.len() {
            let entity = self.entities.remove(index);
            log::debug!("Compositor: {} to front", entity.id());
            self.entities.push(entity);
        }
        true
    }

    /// Move the selected entity to the bottom of the stack.
    pub fn send_selected_to_back(&mut self) -> bool {
        let Some(index) = self.selected.and_then(|id| self.index_of(id)) else {
            return false;
        };
        if index != 0 {
            let entity = self.entities.remove(index);
            log::debug!("Compositor: {} to back", entity.id());
            self.entities.insert(0, entity);
        }
        true
    }

    // ---------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------

    /// Remove the selected entity, release it and clear the selection
    /// (without notifying observers).
    pub fn delete_selected(&mut self) -> Option<EntityId> {
        let id = self.selected?;
        self.delete(id).ok().map(|()| id)
    }

    /// Remove and release `id`.  Clears the selection if it pointed there.
    pub fn delete(&mut self, id: EntityId) -> Result<(), CompositorError> {
        let index = self
            .index_of(id)
            .ok_or(CompositorError::EntityNotFound(id))?;
        let mut entity = self.entities.remove(index);
        self.ids.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("Compositor: deleted {id}");
        entity.release()
    }

    /// Release every entity and empty the stack.  Calling this on an empty
    /// compositor is a no-op.
    pub fn release_all(&mut self) {
        if self.entities.is_empty() {
            return;
        }
        log::debug!("Compositor: releasing {} entities", self.entities.len());
        for entity in &mut self.entities {
            if let Err(e) = entity.release() {
                log::warn!("Compositor: {e}");
            }
        }
        self.entities.clear();
        self.ids.clear();
        self.selected = None;
    }

    // ---------------------------------------------------------------
    // Drawing
    // ---------------------------------------------------------------

    /// Draw one frame.
    ///
    /// Pass A draws every entity back to front without overlay; pass B
    /// draws the selected entity again on top with the selection wash and
    /// its border.  The surface is not cleared.
    pub fn draw<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        let canvas = self.canvas;
        for entity in &mut self.entities {
            entity.draw(surface, canvas, None);
        }
        let overlay = self.config.overlay_style();
        if let Some(entity) = self.selected_entity_mut() {
            entity.draw(surface, canvas, Some(&overlay));
        }
    }

    /// Render the composition to a fresh offscreen surface over an opaque
    /// background.
    ///
    /// Clears the selection silently and does not restore it.  If the
    /// surface cannot be allocated the error is returned and neither the
    /// stack nor the selection is touched.
    pub fn snapshot<S: RenderSurface>(&mut self, surface: &S) -> Result<S, CompositorError> {
        let width = self.canvas.width.round().max(0.0) as u32;
        let height = self.canvas.height.round().max(0.0) as u32;
        let mut offscreen = surface.create_offscreen(width, height)?;

        self.clear_selection(false);
        offscreen.clear(self.config.background);
        let canvas = self.canvas;
        for entity in &mut self.entities {
            entity.draw(&mut offscreen, canvas, None);
        }
        log::debug!(
            "Compositor: snapshot {width}×{height} with {} entities",
            self.entities.len()
        );
        Ok(offscreen)
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.release_all();
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Affine, Quad};
    use crate::layer::{Color, TextLayer};
    use crate::surface::{BorderStyle, ResourceSlot};
    use crate::transform::Transform;
    use std::cell::RefCell;
    use std::rc::Rc;

    const CANVAS: Size = Size::new(200.0, 100.0);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Text(String),
        Fill,
        Stroke,
        Clear(Color),
    }

    /// 20 px per char, 20 px high; logs draw calls.
    #[derive(Default)]
    struct Log {
        calls: Vec<Call>,
        fail_alloc: bool,
    }

    impl RenderSurface for Log {
        fn size(&self) -> Size {
            CANVAS
        }
        fn measure_text(&mut self, text: &str, _style: &TextStyle) -> Size {
            Size::new(20.0 * text.chars().count() as f32, 20.0)
        }
        fn push_transform(&mut self, _m: Affine) {}
        fn pop_transform(&mut self) {}
        fn draw_text(&mut self, layer: &TextLayer, _slot: &mut ResourceSlot) {
            self.calls.push(Call::Text(layer.text().to_string()));
        }
        fn fill_quad(&mut self, _quad: &Quad, _color: Color) {
            self.calls.push(Call::Fill);
        }
        fn stroke_quad(&mut self, _quad: &Quad, _border: &BorderStyle) {
            self.calls.push(Call::Stroke);
        }
        fn clear(&mut self, color: Color) {
            self.calls.push(Call::Clear(color));
        }
        fn create_offscreen(&self, width: u32, height: u32) -> Result<Self, CompositorError> {
            if self.fail_alloc {
                return Err(CompositorError::ResourceExhausted { width, height });
            }
            Ok(Self::default())
        }
    }

    fn text(s: &str) -> Entity {
        Entity::new(TextLayer::new(s, TextStyle::default()))
    }

    fn recorded(compositor: &mut Compositor) -> Rc<RefCell<Vec<CompositorEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        compositor.subscribe(move |e| sink.borrow_mut().push(*e));
        events
    }

    #[test]
    fn test_add_does_not_select_or_place() {
        let mut c = Compositor::new(CANVAS);
        let mut e = text("hi");
        e.transform_mut().post_translate(-0.4, 0.0);
        let id = c.add(&mut Log::default(), e).unwrap();
        assert_eq!(c.selected(), None);
        let entity = c.entity(id).unwrap();
        assert_eq!(entity.local_size(), Size::new(40.0, 20.0));
        assert!((entity.transform().cx - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut c = Compositor::new(CANVAS);
        let id = EntityId::new();
        c.add(&mut Log::default(), Entity::with_id(id, TextLayer::new("a", TextStyle::default())))
            .unwrap();
        let err = c
            .add(&mut Log::default(), Entity::with_id(id, TextLayer::new("b", TextStyle::default())))
            .unwrap_err();
        assert_eq!(err, CompositorError::DuplicateEntity(id));
        assert_eq!(c.len(), 1);
        assert_eq!(c.entity(id).unwrap().text_layer().unwrap().text(), "a");
    }

    #[test]
    fn test_add_rejects_scale_and_normalizes_transform() {
        let mut c = Compositor::new(CANVAS);
        let mut big = text("big");
        big.transform_mut().scale = 50.0;
        let err = c.add(&mut Log::default(), big).unwrap_err();
        assert!(matches!(err, CompositorError::ScaleOutOfRange { scale, .. } if scale == 50.0));
        assert!(c.is_empty());

        let mut off = text("off");
        *off.transform_mut() = Transform {
            cx: 7.5,
            cy: -3.0,
            scale: 2.0,
            rotation: 20.0,
            flipped: false,
        };
        let id = c.add(&mut Log::default(), off).unwrap();
        let t = c.entity(id).unwrap().transform();
        assert_eq!((t.cx, t.cy), (1.0, 0.0));
        assert!(t.rotation > -std::f32::consts::PI && t.rotation <= std::f32::consts::PI);
        assert_eq!(t.scale, 2.0);
    }

    #[test]
    fn test_add_and_place_centres_scales_selects() {
        let mut c = Compositor::new(CANVAS);
        let events = recorded(&mut c);
        let id = c.add_and_place(&mut Log::default(), text("hi")).unwrap();
        let e = c.entity(id).unwrap();
        assert_eq!(e.absolute_center(CANVAS), Point::new(100.0, 50.0));
        assert_eq!(e.transform().scale, 1.0);
        assert!(e.is_selected());
        assert!(e.border_style().is_some());
        assert_eq!(*events.borrow(), vec![CompositorEvent::Selected(Some(id))]);
    }

    #[test]
    fn test_add_and_place_shrinks_wide_text() {
        let mut c = Compositor::new(CANVAS);
        // 20 chars → 400 px wide → 0.45
        let id = c.add_and_place(&mut Log::default(), text("aaaaaaaaaaaaaaaaaaaa")).unwrap();
        let scale = c.entity(id).unwrap().transform().scale;
        assert!((scale - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_select_unknown_is_rejected() {
        let mut c = Compositor::new(CANVAS);
        let ghost = EntityId::new();
        assert_eq!(c.select(Some(ghost), true), Err(CompositorError::EntityNotFound(ghost)));
        assert_eq!(c.selected(), None);
    }

    #[test]
    fn test_select_moves_flag_and_is_idempotent() {
        let mut c = Compositor::new(CANVAS);
        let a = c.add(&mut Log::default(), text("a")).unwrap();
        let b = c.add(&mut Log::default(), text("b")).unwrap();
        let events = recorded(&mut c);

        c.select(Some(a), true).unwrap();
        c.select(Some(a), true).unwrap();
        c.select(Some(b), false).unwrap();
        assert!(!c.entity(a).unwrap().is_selected());
        assert!(c.entity(b).unwrap().is_selected());
        assert_eq!(*events.borrow(), vec![CompositorEvent::Selected(Some(a))]);
    }

    #[test]
    fn test_unselect_noop_when_empty() {
        let mut c = Compositor::new(CANVAS);
        let events = recorded(&mut c);
        c.unselect();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_hit_test_empty_stack() {
        let c = Compositor::new(CANVAS);
        assert_eq!(c.hit_test(Point::new(100.0, 50.0)), None);
    }

    #[test]
    fn test_hit_test_frontmost_wins() {
        let mut c = Compositor::new(CANVAS);
        let back = c.add(&mut Log::default(), text("hi")).unwrap();
        let front = c.add(&mut Log::default(), text("hi")).unwrap();
        assert_eq!(c.hit_test(Point::new(100.0, 50.0)), Some(front));
        c.select(Some(front), false).unwrap();
        c.send_selected_to_back();
        assert_eq!(c.hit_test(Point::new(100.0, 50.0)), Some(back));
    }

    #[test]
    fn test_tap_selects_and_miss_clears() {
        let mut c = Compositor::new(CANVAS);
        let id = c.add(&mut Log::default(), text("hi")).unwrap();
        let events = recorded(&mut c);
        c.tap(Point::new(100.0, 50.0));
        assert_eq!(c.selected(), Some(id));
        c.tap(Point::new(5.0, 5.0));
        assert_eq!(c.selected(), None);
        assert_eq!(
            *events.borrow(),
            vec![CompositorEvent::Selected(Some(id)), CompositorEvent::Selected(None)]
        );
    }

    #[test]
    fn test_double_tap_only_with_selection() {
        let mut c = Compositor::new(CANVAS);
        let events = recorded(&mut c);
        assert!(!c.double_tap());
        let id = c.add_and_place(&mut Log::default(), text("hi")).unwrap();
        let order = c.stack_order();
        assert!(c.double_tap());
        assert_eq!(c.stack_order(), order);
        assert_eq!(events.borrow().last(), Some(&CompositorEvent::DoubleTap(id)));
    }

    #[test]
    fn test_long_press_promotes_selected_only_when_inside() {
        let mut c = Compositor::new(CANVAS);
        let a = c.add(&mut Log::default(), text("hi")).unwrap();
        let _b = c.add(&mut Log::default(), text("hi")).unwrap();
        assert!(!c.long_press(Point::new(100.0, 50.0)));

        c.select(Some(a), false).unwrap();
        assert!(!c.long_press(Point::new(5.0, 5.0)));
        assert_eq!(c.index_of(a), Some(0));

        assert!(c.long_press(Point::new(100.0, 50.0)));
        assert_eq!(c.index_of(a), Some(1));
        // Already frontmost: order unchanged.
        let order = c.stack_order();
        c.long_press(Point::new(100.0, 50.0));
        assert_eq!(c.stack_order(), order);
    }

    #[test]
    fn test_commands_without_selection_are_noops() {
        let mut c = Compositor::new(CANVAS);
        c.add(&mut Log::default(), text("hi")).unwrap();
        assert!(!c.translate_selected(10.0, 10.0).any());
        assert!(!c.scale_selected(2.0));
        assert!(!c.rotate_selected(1.0));
        assert!(!c.flip_selected());
        assert!(!c.send_selected_to_back());
        assert!(!c.bring_selected_to_front());
        assert_eq!(c.set_selected_scale(2.0), Ok(false));
        assert_eq!(c.delete_selected(), None);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_translate_clamps_to_canvas() {
        let mut c = Compositor::new(CANVAS);
        let id = c.add_and_place(&mut Log::default(), text("hi")).unwrap();
        c.translate_selected(300.0, 0.0);
        assert_eq!(c.entity(id).unwrap().absolute_center(CANVAS), Point::new(200.0, 50.0));
        assert!(!c.translate_selected(10.0, 0.0).x);
        assert!(c.translate_selected(-20.0, 0.0).x);
        assert!((c.entity(id).unwrap().absolute_center(CANVAS).x - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_scale_selected_limits() {
        let mut c = Compositor::new(CANVAS);
        let id = c.add_and_place(&mut Log::default(), text("hi")).unwrap();
        assert!(c.scale_selected(2.0));
        assert_eq!(c.entity(id).unwrap().transform().scale, 2.0);
        assert!(!c.scale_selected(0.0));
        assert_eq!(c.entity(id).unwrap().transform().scale, 2.0);
        for _ in 0..20 {
            c.scale_selected(3.0);
        }
        assert_eq!(c.entity(id).unwrap().transform().scale, 10.0);
        assert!(c.set_selected_scale(11.0).is_err());
        assert_eq!(c.set_selected_scale(0.5), Ok(true));
    }

    #[test]
    fn test_delete_selected_is_atomic() {
        let mut c = Compositor::new(CANVAS);
        let id = c.add_and_place(&mut Log::default(), text("hi")).unwrap();
        let events = recorded(&mut c);
        assert_eq!(c.delete_selected(), Some(id));
        assert!(c.entity(id).is_none());
        assert!(!c.contains(id));
        assert_eq!(c.selected(), None);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_delete_unknown() {
        let mut c = Compositor::new(CANVAS);
        let ghost = EntityId::new();
        assert_eq!(c.delete(ghost), Err(CompositorError::EntityNotFound(ghost)));
    }

    #[test]
    fn test_set_selected_text_remeasures() {
        let mut c = Compositor::new(CANVAS);
        let id = c.add_and_place(&mut Log::default(), text("hi")).unwrap();
        assert!(c.set_selected_text(&mut Log::default(), "hello"));
        let e = c.entity(id).unwrap();
        assert_eq!(e.text_layer().unwrap().text(), "hello");
        assert_eq!(e.local_size(), Size::new(100.0, 20.0));
    }

    #[test]
    fn test_set_selected_style_needs_selection() {
        let mut c = Compositor::new(CANVAS);
        let id = c.add(&mut Log::default(), text("hi")).unwrap();
        let style = TextStyle {
            font_size: 48.0,
            ..TextStyle::default()
        };
        assert!(!c.set_selected_style(&mut Log::default(), style.clone()));
        assert_eq!(c.entity(id).unwrap().text_layer().unwrap().style(), &TextStyle::default());

        c.select(Some(id), false).unwrap();
        assert!(c.set_selected_style(&mut Log::default(), style.clone()));
        assert_eq!(c.entity(id).unwrap().text_layer().unwrap().style(), &style);
    }

    #[test]
    fn test_draw_two_passes() {
        let mut c = Compositor::new(CANVAS);
        c.add(&mut Log::default(), text("a")).unwrap();
        c.add_and_place(&mut Log::default(), text("b")).unwrap();
        c.add(&mut Log::default(), text("c")).unwrap();
        let mut surface = Log::default();
        c.draw(&mut surface);
        assert_eq!(
            surface.calls,
            vec![
                Call::Text("a".into()),
                Call::Text("b".into()),
                Call::Text("c".into()),
                Call::Text("b".into()),
                Call::Fill,
                Call::Stroke,
            ]
        );
    }

    #[test]
    fn test_snapshot_clears_selection_silently() {
        let mut c = Compositor::new(CANVAS);
        c.add_and_place(&mut Log::default(), text("a")).unwrap();
        let events = recorded(&mut c);
        let snap = c.snapshot(&Log::default()).unwrap();
        assert_eq!(c.selected(), None);
        assert!(events.borrow().is_empty());
        assert_eq!(snap.calls, vec![Call::Clear(Color::WHITE), Call::Text("a".into())]);
    }

    #[test]
    fn test_snapshot_failure_leaves_state() {
        let mut c = Compositor::new(CANVAS);
        let id = c.add_and_place(&mut Log::default(), text("a")).unwrap();
        let failing = Log { fail_alloc: true, ..Default::default() };
        let err = c.snapshot(&failing).err().unwrap();
        assert_eq!(err, CompositorError::ResourceExhausted { width: 200, height: 100 });
        assert_eq!(c.selected(), Some(id));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_release_all() {
        let mut c = Compositor::new(CANVAS);
        c.add_and_place(&mut Log::default(), text("a")).unwrap();
        c.add(&mut Log::default(), text("b")).unwrap();
        c.release_all();
        assert!(c.is_empty());
        assert_eq!(c.selected(), None);
        c.release_all();
        assert!(c.is_empty());
    }

    #[test]
    fn test_canvas_resize_keeps_relative_position() {
        let mut c = Compositor::new(CANVAS);
        let id = c.add_and_place(&mut Log::default(), text("hi")).unwrap();
        c.set_canvas_size(Size::new(400.0, 300.0));
        assert_eq!(c.entity(id).unwrap().absolute_center(c.canvas_size()), Point::new(200.0, 150.0));
        assert!(c.hit_test(Point::new(200.0, 150.0)).is_some());
    }
}
