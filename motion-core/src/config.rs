use serde::{Deserialize, Serialize};

use crate::layer::Color;
use crate::surface::{BorderStyle, OverlayStyle};
use crate::transform::TransformLimits;

/// Tunables for a [`Compositor`](crate::Compositor).
///
/// Every field has a default, so a host can deserialize a partial JSON
/// object (or `{}`) and get a working configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    pub limits: TransformLimits,
    /// Fraction of the canvas width a freshly placed layer may occupy.
    pub initial_fit_ratio: f32,
    /// Alpha of the selection wash, in `[0, 1]`.
    pub selection_alpha: f32,
    /// Colour of the selection wash (its alpha is replaced by
    /// `selection_alpha`).
    pub selection_color: Color,
    /// Border given to entities placed with `add_and_place`.
    pub border: BorderStyle,
    /// Snapshot background.  Opaque so JPEG export keeps it.
    pub background: Color,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            limits: TransformLimits::default(),
            initial_fit_ratio: 0.9,
            selection_alpha: 0.15,
            selection_color: Color::WHITE,
            border: BorderStyle::default(),
            background: Color::WHITE,
        }
    }
}

impl CompositorConfig {
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            fill: self.selection_color.with_alpha(self.selection_alpha),
        }
    }
}
