//! Session file format.
//!
//! ```json
//! {
//!   "canvas": { "width": 1080, "height": 1080 },
//!   "compositor": { "selection_alpha": 0.2 },
//!   "recognizer": { "rotation_enabled": false },
//!   "layers": [
//!     { "text": "TOP TEXT", "style": { "font_size": 64 } },
//!     { "text": "bottom", "transform": { "cy": 0.9 } }
//!   ],
//!   "events": [
//!     { "type": "tap_up", "x": 540, "y": 540 },
//!     { "type": "down", "id": 0, "x": 540, "y": 540, "time_ms": 0 },
//!     { "tick_ms": 600 }
//!   ]
//! }
//! ```
//!
//! `events` mixes recognised gestures, raw pointer events and clock
//! ticks; they are replayed in file order.

use std::fs;
use std::path::Path;

use motion_core::{CompositorConfig, TextLayer, TextStyle, Transform};
use motion_gesture::{GestureEvent, PointerEvent, RecognizerConfig};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
}

/// One layer to add before replay starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerSpec {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
    /// Explicit placement.  Without one the layer is centred, fitted to
    /// the canvas and selected.
    #[serde(default)]
    pub transform: Option<Transform>,
    /// Select the layer after adding it.
    #[serde(default)]
    pub select: bool,
}

impl LayerSpec {
    pub fn to_layer(&self) -> TextLayer {
        let mut layer = TextLayer::new(self.text.clone(), self.style.clone());
        if let Some(transform) = self.transform {
            *layer.transform_mut() = transform;
        }
        layer
    }
}

/// A replay step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Gesture(GestureEvent),
    Pointer(PointerEvent),
    /// Advance the recogniser clock without input.
    Tick { tick_ms: u64 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub canvas: CanvasSpec,
    #[serde(default)]
    pub compositor: CompositorConfig,
    #[serde(default)]
    pub recognizer: RecognizerConfig,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub events: Vec<Step>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self, CliError> {
        let session: Session = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), CliError> {
        let CanvasSpec { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(CliError::InvalidCanvas { width, height });
        }
        for (index, layer) in self.layers.iter().enumerate() {
            let TextStyle { font_size, line_height, .. } = layer.style;
            if !(valid_metric(font_size) && valid_metric(line_height)) {
                return Err(CliError::InvalidStyle {
                    index,
                    font_size,
                    line_height,
                });
            }
        }
        Ok(())
    }
}

/// Largest font size or line height a session may ask for, in pixels.
pub const MAX_FONT_PX: f32 = 4096.0;

fn valid_metric(px: f32) -> bool {
    px.is_finite() && (0.0..=MAX_FONT_PX).contains(&px)
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_session() {
        let session = Session::from_json(r#"{"canvas":{"width":320,"height":240}}"#).unwrap();
        assert_eq!(session.canvas, CanvasSpec { width: 320, height: 240 });
        assert_eq!(session.compositor, CompositorConfig::default());
        assert_eq!(session.recognizer, RecognizerConfig::default());
        assert!(session.layers.is_empty() && session.events.is_empty());
    }

    #[test]
    fn test_zero_canvas_rejected() {
        let err = Session::from_json(r#"{"canvas":{"width":0,"height":240}}"#).unwrap_err();
        assert!(matches!(err, CliError::InvalidCanvas { width: 0, height: 240 }));
    }

    #[test]
    fn test_absurd_font_metrics_rejected() {
        let err = Session::from_json(
            r#"{
                "canvas": {"width": 100, "height": 100},
                "layers": [
                    {"text": "ok"},
                    {"text": "huge", "style": {"font_size": 1e30, "line_height": 1e30}}
                ]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidStyle { index: 1, .. }));

        let err = Session::from_json(
            r#"{"canvas":{"width":10,"height":10},"layers":[{"text":"x","style":{"line_height":-1}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidStyle { index: 0, .. }));

        let edge = format!(
            r#"{{"canvas":{{"width":10,"height":10}},"layers":[{{"text":"x","style":{{"font_size":{MAX_FONT_PX}}}}}]}}"#
        );
        assert!(Session::from_json(&edge).is_ok());
    }

    #[test]
    fn test_steps_parse_in_order() {
        let session = Session::from_json(
            r#"{
                "canvas": {"width": 100, "height": 100},
                "events": [
                    {"type": "tap_up", "x": 1, "y": 2},
                    {"type": "down", "id": 3, "x": 4, "y": 5, "time_ms": 6},
                    {"tick_ms": 700},
                    {"type": "cancel", "time_ms": 800},
                    {"type": "scale_delta", "factor": 1.5}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            session.events,
            vec![
                Step::Gesture(GestureEvent::TapUp { x: 1.0, y: 2.0 }),
                Step::Pointer(PointerEvent::Down { id: 3, x: 4.0, y: 5.0, time_ms: 6 }),
                Step::Tick { tick_ms: 700 },
                Step::Pointer(PointerEvent::Cancel { time_ms: 800 }),
                Step::Gesture(GestureEvent::ScaleDelta { factor: 1.5 }),
            ]
        );
    }

    #[test]
    fn test_unknown_step_rejected() {
        let err = Session::from_json(
            r#"{"canvas":{"width":10,"height":10},"events":[{"type":"wobble"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Session(_)));
    }

    #[test]
    fn test_layer_with_partial_transform() {
        let session = Session::from_json(
            r#"{
                "canvas": {"width": 100, "height": 100},
                "layers": [{"text": "hi", "transform": {"cy": 0.9, "scale": 2}, "select": true}]
            }"#,
        )
        .unwrap();
        let spec = &session.layers[0];
        assert!(spec.select);
        let layer = spec.to_layer();
        assert_eq!(layer.text(), "hi");
        assert_eq!(layer.transform().cx, 0.5);
        assert_eq!(layer.transform().cy, 0.9);
        assert_eq!(layer.transform().scale, 2.0);
        assert_eq!(layer.style(), &TextStyle::default());
    }
}
