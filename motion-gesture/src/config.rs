use serde::{Deserialize, Serialize};

/// Thresholds used by [`PointerRecognizer`](crate::PointerRecognizer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Distance in pixels a pointer may wander before a press stops being
    /// a tap or long-press candidate.
    pub touch_slop: f32,
    /// Max distance between the two taps of a double tap.
    pub double_tap_slop: f32,
    /// Max time from the first tap's release to the second press.
    pub double_tap_timeout_ms: u64,
    /// Hold time before a stationary press becomes a long press.
    pub long_press_timeout_ms: u64,
    /// Emit `RotateDelta` for two-finger twists.
    pub rotation_enabled: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            double_tap_slop: 100.0,
            double_tap_timeout_ms: 300,
            long_press_timeout_ms: 500,
            rotation_enabled: true,
        }
    }
}
