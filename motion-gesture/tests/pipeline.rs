//! Pointer stream → recogniser → adapter → compositor.

use motion_core::{Compositor, CompositorEvent, Entity, EntityId, Point, Size, TextLayer, TextStyle};
use motion_gesture::{GestureAdapter, GestureSource, PointerEvent, PointerRecognizer, RecognizerConfig};
use motion_render::{BoxShaper, RasterSurface};
use std::cell::RefCell;
use std::rc::Rc;

fn style() -> TextStyle {
    TextStyle { font_size: 20.0, line_height: 20.0, ..TextStyle::default() }
}

struct Rig {
    compositor: Compositor,
    recognizer: PointerRecognizer,
    adapter: GestureAdapter,
    events: Rc<RefCell<Vec<CompositorEvent>>>,
}

impl Rig {
    fn new() -> Self {
        let mut compositor = Compositor::new(Size::new(200.0, 100.0));
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        compositor.subscribe(move |e| sink.borrow_mut().push(*e));
        Self {
            compositor,
            recognizer: PointerRecognizer::new(RecognizerConfig::default()),
            adapter: GestureAdapter::new(),
            events,
        }
    }

    fn place(&mut self, text: &str) -> EntityId {
        let mut surface = RasterSurface::new(200, 100, BoxShaper).unwrap();
        self.compositor
            .add_and_place(&mut surface, Entity::new(TextLayer::new(text, style())))
            .unwrap()
    }

    fn feed(&mut self, events: &[PointerEvent]) {
        for e in events {
            self.recognizer.feed(*e);
            self.adapter.pump(&mut self.recognizer, &mut self.compositor);
        }
    }

    fn centre(&self, id: EntityId) -> Point {
        self.compositor.entity(id).unwrap().absolute_center(self.compositor.canvas_size())
    }
}

fn down(id: u64, x: f32, y: f32, t: u64) -> PointerEvent {
    PointerEvent::Down { id, x, y, time_ms: t }
}
fn mv(id: u64, x: f32, y: f32, t: u64) -> PointerEvent {
    PointerEvent::Move { id, x, y, time_ms: t }
}
fn up(id: u64, x: f32, y: f32, t: u64) -> PointerEvent {
    PointerEvent::Up { id, x, y, time_ms: t }
}

#[test]
fn test_tap_then_drag_moves_new_selection() {
    let mut rig = Rig::new();
    let a = rig.place("hi");
    rig.compositor.translate_selected(-60.0, 0.0);
    let b = rig.place("hi");
    assert_eq!(rig.compositor.selected(), Some(b));

    // Tap A at (40, 50), then drag from there.
    rig.feed(&[down(0, 40.0, 50.0, 0), up(0, 40.0, 50.0, 40)]);
    assert_eq!(rig.compositor.selected(), Some(a));

    rig.feed(&[
        down(0, 40.0, 50.0, 1_000),
        mv(0, 60.0, 50.0, 1_016),
        mv(0, 60.0, 70.0, 1_032),
        up(0, 60.0, 70.0, 1_048),
    ]);
    let c = rig.centre(a);
    assert!((c.x - 60.0).abs() < 1e-3 && (c.y - 70.0).abs() < 1e-3, "{c:?}");
    assert_eq!(rig.centre(b), Point::new(100.0, 50.0));
}

#[test]
fn test_pinch_scales_selected() {
    let mut rig = Rig::new();
    let a = rig.place("hi");
    rig.feed(&[
        down(0, 90.0, 50.0, 0),
        down(1, 110.0, 50.0, 0),
        mv(0, 80.0, 50.0, 16),
        mv(1, 120.0, 50.0, 16),
        up(0, 80.0, 50.0, 32),
        up(1, 120.0, 50.0, 32),
    ]);
    let t = rig.compositor.entity(a).unwrap().transform();
    assert!((t.scale - 2.0).abs() < 1e-4, "scale {}", t.scale);
    // Focus wobbled by ±5 and came back.
    let c = rig.centre(a);
    assert!((c.x - 100.0).abs() < 1e-3);
}

#[test]
fn test_long_press_promotes_selected() {
    let mut rig = Rig::new();
    let a = rig.place("hi");
    let b = rig.place("hi");
    rig.compositor.select(Some(a), false).unwrap();
    assert_eq!(rig.compositor.stack_order(), vec![a, b]);

    rig.feed(&[down(0, 100.0, 50.0, 0)]);
    rig.recognizer.tick(600);
    rig.adapter.pump(&mut rig.recognizer, &mut rig.compositor);
    rig.feed(&[up(0, 100.0, 50.0, 700)]);

    assert_eq!(rig.compositor.stack_order(), vec![b, a]);
    // No tap followed the long press, so the selection is untouched.
    assert_eq!(rig.compositor.selected(), Some(a));
}

#[test]
fn test_double_tap_reaches_observer() {
    let mut rig = Rig::new();
    let a = rig.place("hi");
    rig.events.borrow_mut().clear();
    rig.feed(&[
        down(0, 100.0, 50.0, 0),
        up(0, 100.0, 50.0, 30),
        down(0, 101.0, 50.0, 150),
        up(0, 101.0, 50.0, 180),
    ]);
    assert_eq!(*rig.events.borrow(), vec![CompositorEvent::DoubleTap(a)]);
}

#[test]
fn test_twist_rotates_when_enabled() {
    let mut rig = Rig::new();
    let a = rig.place("hi");
    assert!(rig.recognizer.supports_rotation());
    rig.feed(&[
        down(0, 90.0, 50.0, 0),
        down(1, 110.0, 50.0, 0),
        mv(1, 90.0, 70.0, 16),
        up(0, 90.0, 50.0, 32),
        up(1, 90.0, 70.0, 32),
    ]);
    let rotation = rig.compositor.entity(a).unwrap().transform().rotation;
    assert!((rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-4, "rotation {rotation}");
}
