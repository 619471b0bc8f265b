//! # motion-text
//!
//! System-font text backend for the overlay compositor.  Provides text
//! shaping and glyph rasterization via `cosmic-text`.
//!
//! ## Architecture
//!
//! ```text
//! TextEngine (cosmic-text FontSystem + SwashCache)
//!     │
//!     ▼
//! measure(str, style) ──► Size          (LRU cached)
//! rasterize(str, style) ──► GlyphMask   (LRU cached)
//!     │
//!     ▼
//! RasterSurface<TextEngine>  (motion-render)
//! ```
//!
//! - **`engine`** — Text shaping, font resolution, glyph rasterization.

pub mod engine;

pub use engine::{TextEngine, DEFAULT_CACHE_CAPACITY};

/// A raster surface that draws with system fonts.
pub type TextSurface = motion_render::RasterSurface<TextEngine>;
