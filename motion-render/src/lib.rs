//! # motion-render
//!
//! Software rendering backend for the overlay compositor.
//!
//! ## Architecture
//!
//! ```text
//!  Compositor (motion-core)
//!       │  measure / push_transform / draw_text / fill_quad
//!       ▼
//!  RasterSurface<S: TextShaper>
//!       │  glyph masks cached per entity (ResourceSlot)
//!       ▼
//!  Bitmap (RGBA8)  ──▶  encode::save()  ──▶  PNG / JPEG
//! ```
//!
//! ## Crate modules
//!
//! - [`bitmap`] — RGBA8 pixel buffer with deterministic blending
//! - [`shaper`] — text measurement / rasterisation trait and the font-free `BoxShaper`
//! - [`raster`] — the `RenderSurface` implementation
//! - [`encode`] — PNG / JPEG export

pub mod bitmap;
pub mod encode;
pub mod raster;
pub mod shaper;

// Re-exports for convenience
pub use bitmap::{Bitmap, Rgba8};
pub use encode::{encode, encode_to_vec, save, EncodeError, ImageFormat};
pub use raster::RasterSurface;
pub use shaper::{BoxShaper, GlyphMask, TextShaper, MAX_MASK_PIXELS};
