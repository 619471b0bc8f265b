//! Discrete gesture events and the source trait the adapter drains.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A recognised gesture.  Coordinates and deltas are canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    /// Single tap released at `(x, y)`.
    TapUp { x: f32, y: f32 },
    DoubleTap,
    /// Press held in place at `(x, y)`.
    LongPress { x: f32, y: f32 },
    /// Change of the pointer focus.
    MoveDelta { dx: f32, dy: f32 },
    /// Span ratio since the previous scale event.
    ScaleDelta { factor: f32 },
    /// Twist since the previous rotate event.
    RotateDelta { radians: f32 },
}

impl GestureEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TapUp { .. } => "tap_up",
            Self::DoubleTap => "double_tap",
            Self::LongPress { .. } => "long_press",
            Self::MoveDelta { .. } => "move_delta",
            Self::ScaleDelta { .. } => "scale_delta",
            Self::RotateDelta { .. } => "rotate_delta",
        }
    }
}

/// Anything that yields gesture events in arrival order.
pub trait GestureSource {
    /// Next pending event, if any.
    fn poll_event(&mut self) -> Option<GestureEvent>;

    /// Whether `RotateDelta` events from this source should be honoured.
    fn supports_rotation(&self) -> bool {
        false
    }
}

/// FIFO of pre-recorded events, e.g. a replayed session.
#[derive(Clone, Debug, Default)]
pub struct QueuedGestures {
    events: VecDeque<GestureEvent>,
    rotation: bool,
}

impl QueuedGestures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotation = enabled;
        self
    }

    #[inline]
    pub fn push(&mut self, event: GestureEvent) {
        self.events.push_back(event);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Extend<GestureEvent> for QueuedGestures {
    fn extend<I: IntoIterator<Item = GestureEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

impl FromIterator<GestureEvent> for QueuedGestures {
    fn from_iter<I: IntoIterator<Item = GestureEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
            rotation: false,
        }
    }
}

impl GestureSource for QueuedGestures {
    fn poll_event(&mut self) -> Option<GestureEvent> {
        self.events.pop_front()
    }

    fn supports_rotation(&self) -> bool {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut q: QueuedGestures = [
            GestureEvent::DoubleTap,
            GestureEvent::MoveDelta { dx: 1.0, dy: 2.0 },
        ]
        .into_iter()
        .collect();
        q.push(GestureEvent::ScaleDelta { factor: 2.0 });
        assert_eq!(q.len(), 3);
        assert_eq!(q.poll_event(), Some(GestureEvent::DoubleTap));
        assert_eq!(q.poll_event(), Some(GestureEvent::MoveDelta { dx: 1.0, dy: 2.0 }));
        assert_eq!(q.poll_event(), Some(GestureEvent::ScaleDelta { factor: 2.0 }));
        assert_eq!(q.poll_event(), None);
        assert!(!q.supports_rotation());
    }

    #[test]
    fn test_event_json_tagging() {
        let events: Vec<GestureEvent> = serde_json::from_str(
            r#"[{"type":"tap_up","x":10,"y":20},{"type":"double_tap"},{"type":"rotate_delta","radians":0.5}]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                GestureEvent::TapUp { x: 10.0, y: 20.0 },
                GestureEvent::DoubleTap,
                GestureEvent::RotateDelta { radians: 0.5 },
            ]
        );
        assert_eq!(events[0].name(), "tap_up");
    }
}
