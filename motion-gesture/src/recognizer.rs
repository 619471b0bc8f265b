//! Raw pointer stream → [`GestureEvent`]s.
//!
//! Tracks every active pointer and derives:
//!
//! * **focus** — mean pointer position; its change is a `MoveDelta`
//! * **span** — mean distance of pointers from the focus; its ratio is a
//!   `ScaleDelta` (two or more pointers)
//! * **angle** — direction from the first to the second pointer; its
//!   change is a `RotateDelta`
//!
//! Taps are classified on the single-pointer path:
//!
//! ```text
//!  Down ──(held ≥ long_press_timeout, inside slop)──▸ LongPress
//!    │
//!    ├──(leaves slop)──▸ drag: MoveDelta…, no tap
//!    │
//!    └──Up inside slop──▸ TapUp ──(Down within double_tap_timeout)──▸ DoubleTap
//! ```
//!
//! The recogniser has no clock of its own.  Long presses are detected on
//! the next event or on [`PointerRecognizer::tick`].

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

use motion_core::Point;

use crate::config::RecognizerConfig;
use crate::event::{GestureEvent, GestureSource};

/// Pointer input, canvas pixels, timestamps in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { id: u64, x: f32, y: f32, time_ms: u64 },
    Move { id: u64, x: f32, y: f32, time_ms: u64 },
    Up { id: u64, x: f32, y: f32, time_ms: u64 },
    /// Platform aborted the gesture; drop all pointers.
    Cancel { time_ms: u64 },
}

impl PointerEvent {
    pub fn time_ms(&self) -> u64 {
        match *self {
            Self::Down { time_ms, .. }
            | Self::Move { time_ms, .. }
            | Self::Up { time_ms, .. }
            | Self::Cancel { time_ms } => time_ms,
        }
    }
}

/// The press that started a single-pointer sequence.
#[derive(Clone, Copy, Debug)]
struct Press {
    start: Point,
    down_ms: u64,
    /// Pointer left the touch slop.
    moved: bool,
    /// More than one pointer joined.
    multi: bool,
    long_fired: bool,
    /// This press already produced a `DoubleTap`.
    second_tap: bool,
}

impl Press {
    #[inline]
    fn is_tap_candidate(&self) -> bool {
        !(self.moved || self.multi || self.long_fired)
    }
}

/// Turns pointer events into gesture events.
#[derive(Debug)]
pub struct PointerRecognizer {
    config: RecognizerConfig,
    /// Active pointers in press order.
    pointers: Vec<(u64, Point)>,
    press: Option<Press>,
    /// Position and release time of the last single tap.
    last_tap: Option<(Point, u64)>,
    prev_focus: Option<Point>,
    prev_span: Option<f32>,
    prev_angle: Option<f32>,
    out: VecDeque<GestureEvent>,
}

impl Default for PointerRecognizer {
    fn default() -> Self {
        Self::new(RecognizerConfig::default())
    }
}

impl PointerRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            pointers: Vec::new(),
            press: None,
            last_tap: None,
            prev_focus: None,
            prev_span: None,
            prev_angle: None,
            out: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Number of pointers currently down.
    #[inline]
    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Recognised events not yet polled.
    #[inline]
    pub fn pending(&self) -> usize {
        self.out.len()
    }

    // ───────────────────── pointer geometry ─────────────────────

    fn focus(&self) -> Option<Point> {
        if self.pointers.is_empty() {
            return None;
        }
        let n = self.pointers.len() as f32;
        let (sx, sy) = self
            .pointers
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (_, p)| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }

    fn span(&self) -> Option<f32> {
        if self.pointers.len() < 2 {
            return None;
        }
        let focus = self.focus()?;
        let total: f32 = self.pointers.iter().map(|(_, p)| p.distance(focus)).sum();
        Some(total / self.pointers.len() as f32)
    }

    fn angle(&self) -> Option<f32> {
        match self.pointers.as_slice() {
            [(_, a), (_, b), ..] => Some((b.y - a.y).atan2(b.x - a.x)),
            _ => None,
        }
    }

    /// Re-seed the move/scale/rotate baselines after the pointer set
    /// changed, so adding or lifting a finger does not cause a jump.
    fn rebase(&mut self) {
        self.prev_focus = self.focus();
        self.prev_span = self.span();
        self.prev_angle = self.angle();
    }

    // ───────────────────── input ─────────────────────

    /// Fire a pending long press if its timeout has elapsed at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        let timeout = self.config.long_press_timeout_ms;
        let Some(press) = self.press.as_mut() else {
            return;
        };
        if press.is_tap_candidate() && now_ms.saturating_sub(press.down_ms) >= timeout {
            press.long_fired = true;
            let at = press.start;
            self.last_tap = None;
            log::trace!("PointerRecognizer: long press at ({}, {})", at.x, at.y);
            self.out.push_back(GestureEvent::LongPress { x: at.x, y: at.y });
        }
    }

    /// Feed one pointer event.
    pub fn feed(&mut self, event: PointerEvent) {
        self.tick(event.time_ms());
        match event {
            PointerEvent::Down { id, x, y, time_ms } => self.on_down(id, Point::new(x, y), time_ms),
            PointerEvent::Move { id, x, y, .. } => self.on_move(id, Point::new(x, y)),
            PointerEvent::Up { id, x, y, time_ms } => self.on_up(id, Point::new(x, y), time_ms),
            PointerEvent::Cancel { .. } => self.cancel(),
        }
    }

    fn on_down(&mut self, id: u64, p: Point, time_ms: u64) {
        if self.pointers.iter().any(|(pid, _)| *pid == id) {
            log::warn!("PointerRecognizer: duplicate down for pointer {id}");
            return;
        }

        if self.pointers.is_empty() {
            let second_tap = match self.last_tap.take() {
                Some((at, up_ms)) => {
                    time_ms.saturating_sub(up_ms) <= self.config.double_tap_timeout_ms
                        && at.distance(p) <= self.config.double_tap_slop
                }
                None => false,
            };
            if second_tap {
                self.out.push_back(GestureEvent::DoubleTap);
            }
            self.press = Some(Press {
                start: p,
                down_ms: time_ms,
                moved: false,
                multi: false,
                long_fired: false,
                second_tap,
            });
        } else if let Some(press) = self.press.as_mut() {
            press.multi = true;
        }

        self.pointers.push((id, p));
        self.rebase();
    }

    fn on_move(&mut self, id: u64, p: Point) {
        let Some(slot) = self.pointers.iter_mut().find(|(pid, _)| *pid == id) else {
            return;
        };
        slot.1 = p;

        // A lone pointer inside the slop is still a tap candidate: hold the
        // baseline so the whole distance is reported once it breaks out.
        if let Some(press) = self.press.as_mut() {
            if !press.moved && !press.multi {
                if press.start.distance(p) <= self.config.touch_slop {
                    return;
                }
                press.moved = true;
            }
        }

        if let (Some(prev), Some(focus)) = (self.prev_focus, self.focus()) {
            let d = focus - prev;
            if d.x != 0.0 || d.y != 0.0 {
                self.out.push_back(GestureEvent::MoveDelta { dx: d.x, dy: d.y });
            }
            self.prev_focus = Some(focus);
        }

        if let (Some(prev), Some(span)) = (self.prev_span, self.span()) {
            if prev > 0.0 && span > 0.0 && span != prev {
                self.out.push_back(GestureEvent::ScaleDelta { factor: span / prev });
            }
            self.prev_span = Some(span);
        }

        if let (Some(prev), Some(angle)) = (self.prev_angle, self.angle()) {
            let mut delta = (angle - prev) % TAU;
            if delta > PI {
                delta -= TAU;
            } else if delta <= -PI {
                delta += TAU;
            }
            if self.config.rotation_enabled && delta != 0.0 {
                self.out.push_back(GestureEvent::RotateDelta { radians: delta });
            }
            self.prev_angle = Some(angle);
        }
    }

    fn on_up(&mut self, id: u64, p: Point, time_ms: u64) {
        let Some(index) = self.pointers.iter().position(|(pid, _)| *pid == id) else {
            return;
        };
        self.pointers.remove(index);

        if !self.pointers.is_empty() {
            self.rebase();
            return;
        }

        let press = self.press.take();
        self.last_tap = None;
        if let Some(press) = press {
            let inside = press.start.distance(p) <= self.config.touch_slop;
            if press.is_tap_candidate() && inside && !press.second_tap {
                self.out.push_back(GestureEvent::TapUp { x: p.x, y: p.y });
                self.last_tap = Some((p, time_ms));
            }
        }
        self.rebase();
    }

    /// Drop all pointers and pending tap state.  Already recognised events
    /// stay queued.
    pub fn cancel(&mut self) {
        self.pointers.clear();
        self.press = None;
        self.last_tap = None;
        self.rebase();
    }
}

impl GestureSource for PointerRecognizer {
    fn poll_event(&mut self) -> Option<GestureEvent> {
        self.out.pop_front()
    }

    fn supports_rotation(&self) -> bool {
        self.config.rotation_enabled
    }
}

// ===================================================================
// Tests
// ===================================================================
