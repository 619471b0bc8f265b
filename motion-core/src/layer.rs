//! Entity payloads.
//!
//! A [`TextLayer`] holds the text, its style, the unscaled size measured by
//! the render surface and the layer's [`Transform`].  [`EntityContent`] is
//! the closed set of payload kinds the compositor knows how to measure and
//! draw; today that is text only.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::surface::{RenderSurface, ResourceSlot};
use crate::transform::{Transform, TransformLimits};

// ── Color ───────────────────────────────────────────────────────────

/// Straight (non-premultiplied) RGBA8 colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with alpha replaced by `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

// ── Text style ──────────────────────────────────────────────────────

/// Horizontal alignment of lines within a multi-line layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Style of a text layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font identifier: a family name or one of the generic families
    /// `sans-serif`, `serif`, `monospace`.
    pub font: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Line height in pixels.
    pub line_height: f32,
    pub color: Color,
    pub align: TextAlign,
    /// Font weight (100–900).
    pub weight: u16,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: String::from("sans-serif"),
            font_size: 32.0,
            line_height: 38.0,
            color: Color::BLACK,
            align: TextAlign::Center,
            weight: 700,
            italic: false,
        }
    }
}

// ── TextLayer ───────────────────────────────────────────────────────

/// Text payload of an entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextLayer {
    text: String,
    #[serde(default)]
    style: TextStyle,
    #[serde(default)]
    transform: Transform,
    /// Size at scale 1.0, as measured by the render surface.
    #[serde(skip)]
    unscaled_size: Size,
    /// Bumped whenever text or style changes; render backends key their
    /// cached rasterisations on it.
    #[serde(skip)]
    revision: u64,
}

impl TextLayer {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            transform: Transform::default(),
            unscaled_size: Size::ZERO,
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Replace the text.  The layer must be re-measured afterwards.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision += 1;
    }

    /// Replace the style.  The layer must be re-measured afterwards.
    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
        self.revision += 1;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn unscaled_size(&self) -> Size {
        self.unscaled_size
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ask `surface` for the unscaled size of this layer and store it.
    pub fn measure<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> Size {
        self.unscaled_size = surface.measure_text(&self.text, &self.style);
        self.unscaled_size
    }

    /// Largest scale `s ≤ 1` with `s · width ≤ fit_ratio · canvas_width`.
    pub fn initial_scale(&self, canvas_width: f32, fit_ratio: f32) -> f32 {
        let w = self.unscaled_size.width;
        if !(w > 0.0) {
            return 1.0;
        }
        (fit_ratio * canvas_width / w).min(1.0)
    }
}

// ── EntityContent ───────────────────────────────────────────────────

/// Payload variants an entity can carry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityContent {
    Text(TextLayer),
}

impl EntityContent {
    /// Refresh the unscaled size from `surface`.
    pub fn measure<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> Size {
        match self {
            Self::Text(layer) => layer.measure(surface),
        }
    }

    /// Draw at the surface's current transform.
    pub fn draw<S: RenderSurface + ?Sized>(&self, surface: &mut S, slot: &mut ResourceSlot) {
        match self {
            Self::Text(layer) => surface.draw_text(layer, slot),
        }
    }

    /// Unscaled local bounds: `[0, w] × [0, h]`.
    pub fn local_bounds(&self) -> Size {
        match self {
            Self::Text(layer) => layer.unscaled_size(),
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            Self::Text(layer) => layer.transform(),
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Self::Text(layer) => layer.transform_mut(),
        }
    }

    pub fn initial_scale(&self, canvas_width: f32, fit_ratio: f32, limits: &TransformLimits) -> f32 {
        let scale = match self {
            Self::Text(layer) => layer.initial_scale(canvas_width, fit_ratio),
        };
        limits.clamp_scale(scale)
    }

    pub fn as_text(&self) -> Option<&TextLayer> {
        match self {
            Self::Text(layer) => Some(layer),
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextLayer> {
        match self {
            Self::Text(layer) => Some(layer),
        }
    }
}

impl From<TextLayer> for EntityContent {
    fn from(layer: TextLayer) -> Self {
        Self::Text(layer)
    }
}

// ===================================================================
// Tests
// ===================================================================
