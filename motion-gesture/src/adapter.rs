//! Gesture → Compositor Adapter
//!
//! Maps recognised gestures onto compositor commands.
//!
//! ```text
//!  GestureSource ──GestureEvent──▸ GestureAdapter ──▸ Compositor
//! ```
//!
//! | Gesture        | Command                         |
//! |----------------|---------------------------------|
//! | `TapUp`        | `tap(x, y)`                     |
//! | `DoubleTap`    | `double_tap()`                  |
//! | `LongPress`    | `long_press(x, y)`              |
//! | `MoveDelta`    | `translate_selected(dx, dy)`    |
//! | `ScaleDelta`   | `scale_selected(factor)`        |
//! | `RotateDelta`  | `rotate_selected(dθ)` if enabled |
//!
//! The adapter holds no gesture state; events are applied strictly in
//! arrival order.

use motion_core::{Compositor, Point};

use crate::event::{GestureEvent, GestureSource};

/// Outcome of draining a source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Events pulled from the source.
    pub total: usize,
    /// Events whose command changed compositor state or fired a callback.
    pub applied: usize,
    /// Events that were no-ops (no selection, clamped, rotation disabled).
    pub ignored: usize,
}

/// Stateless dispatcher from [`GestureEvent`] to compositor commands.
#[derive(Debug)]
pub struct GestureAdapter {
    rotation_enabled: bool,
    /// Running count of events dispatched (lifetime of the adapter).
    events_dispatched: u64,
}

impl Default for GestureAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureAdapter {
    pub fn new() -> Self {
        Self {
            rotation_enabled: true,
            events_dispatched: 0,
        }
    }

    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotation_enabled = enabled;
        self
    }

    #[inline]
    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    #[inline]
    pub fn total_dispatched(&self) -> u64 {
        self.events_dispatched
    }

    /// Apply one event.  Returns `true` if the command had an effect.
    pub fn dispatch(&mut self, compositor: &mut Compositor, event: GestureEvent) -> bool {
        self.dispatch_with(compositor, event, self.rotation_enabled)
    }

    fn dispatch_with(&mut self, compositor: &mut Compositor, event: GestureEvent, rotation: bool) -> bool {
        self.events_dispatched += 1;
        log::trace!("GestureAdapter: {event:?}");
        match event {
            GestureEvent::TapUp { x, y } => {
                let before = compositor.selected();
                compositor.tap(Point::new(x, y));
                compositor.selected() != before
            }
            GestureEvent::DoubleTap => compositor.double_tap(),
            GestureEvent::LongPress { x, y } => compositor.long_press(Point::new(x, y)),
            GestureEvent::MoveDelta { dx, dy } => compositor.translate_selected(dx, dy).any(),
            GestureEvent::ScaleDelta { factor } => compositor.scale_selected(factor),
            GestureEvent::RotateDelta { radians } if rotation => compositor.rotate_selected(radians),
            GestureEvent::RotateDelta { .. } => false,
        }
    }

    /// Drain `source` into `compositor`.
    ///
    /// Rotation is honoured only when both the adapter and the source
    /// allow it.
    pub fn pump<G: GestureSource + ?Sized>(
        &mut self,
        source: &mut G,
        compositor: &mut Compositor,
    ) -> DispatchResult {
        let rotation = self.rotation_enabled && source.supports_rotation();
        let mut result = DispatchResult::default();
        while let Some(event) = source.poll_event() {
            result.total += 1;
            if self.dispatch_with(compositor, event, rotation) {
                result.applied += 1;
            } else {
                result.ignored += 1;
            }
        }
        if result.total > 0 {
            log::debug!(
                "GestureAdapter: pumped {} events ({} applied, {} ignored)",
                result.total,
                result.applied,
                result.ignored
            );
        }
        result
    }
}

// ===================================================================
// Tests
// ===================================================================
