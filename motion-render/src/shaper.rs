//! Text measurement and rasterisation backends for [`RasterSurface`].
//!
//! A [`TextShaper`] turns a string plus [`TextStyle`] into an unscaled
//! size and a coverage mask of that size.  The raster surface maps the
//! mask through the entity transform, so shapers never see scale,
//! rotation or flips.
//!
//! [`RasterSurface`]: crate::raster::RasterSurface

use motion_core::{Size, TextAlign, TextStyle};

use crate::bitmap::MAX_PIXELS;

/// Largest mask a shaper will allocate.  Same pixel cap as [`Bitmap`].
///
/// [`Bitmap`]: crate::bitmap::Bitmap
pub const MAX_MASK_PIXELS: u64 = MAX_PIXELS;

/// 8-bit coverage mask, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMask {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    /// Zeroed mask, or an empty 0×0 mask when `width × height` exceeds
    /// [`MAX_MASK_PIXELS`] or cannot be allocated.
    pub fn new(width: u32, height: u32) -> Self {
        Self::try_new(width, height).unwrap_or_else(|| {
            log::warn!("GlyphMask: {width}×{height} exceeds the pixel cap, drawing nothing");
            Self::default()
        })
    }

    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        let count = (width as u64).checked_mul(height as u64)?;
        if count > MAX_MASK_PIXELS {
            return None;
        }
        let count = usize::try_from(count).ok()?;
        let mut coverage = Vec::new();
        coverage.try_reserve_exact(count).ok()?;
        coverage.resize(count, 0);
        Some(Self { width, height, coverage })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coverage.is_empty()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x < self.width && y < self.height {
            self.coverage[y as usize * self.width as usize + x as usize]
        } else {
            0
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            self.coverage[y as usize * self.width as usize + x as usize] = value;
        }
    }

    /// Bilinear sample at mask-space `(u, v)`, where pixel `(i, j)` is
    /// centred at `(i + 0.5, j + 0.5)`.  Outside the mask is zero.
    pub fn sample(&self, u: f32, v: f32) -> u8 {
        let fx = u - 0.5;
        let fy = v - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let at = |x: f32, y: f32| -> f32 {
            if x < 0.0 || y < 0.0 {
                0.0
            } else {
                self.get(x as u32, y as u32) as f32
            }
        };
        let top = at(x0, y0) * (1.0 - tx) + at(x0 + 1.0, y0) * tx;
        let bottom = at(x0, y0 + 1.0) * (1.0 - tx) + at(x0 + 1.0, y0 + 1.0) * tx;
        (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|&c| c == 0)
    }
}

/// Measures and rasterises text at scale 1.
pub trait TextShaper {
    /// Unscaled size of `text`.
    fn measure(&mut self, text: &str, style: &TextStyle) -> Size;

    /// Coverage mask for `text`, sized `ceil(measure(text))`.
    fn rasterize(&mut self, text: &str, style: &TextStyle) -> GlyphMask;
}

/// Horizontal offset of a line of `line_width` inside a block of
/// `block_width` for `align`.
#[inline]
pub fn align_offset(align: TextAlign, block_width: f32, line_width: f32) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => (block_width - line_width) * 0.5,
        TextAlign::Right => block_width - line_width,
    }
}

// ───────────────────────────────────────────────────────────────────
// BoxShaper
// ───────────────────────────────────────────────────────────────────

/// Font-free shaper: every character is a box `font_size` wide and each
/// line is `line_height` tall.
///
/// Output depends only on the input, which makes it the backend for
/// headless tests and for environments with no system fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxShaper;

impl BoxShaper {
    pub fn new() -> Self {
        Self
    }

    fn line_height(style: &TextStyle) -> f32 {
        if style.line_height > 0.0 {
            style.line_height
        } else {
            style.font_size
        }
    }
}

impl TextShaper for BoxShaper {
    fn measure(&mut self, text: &str, style: &TextStyle) -> Size {
        let advance = style.font_size.max(0.0);
        let mut lines = 0usize;
        let mut widest = 0usize;
        for line in text.lines() {
            lines += 1;
            widest = widest.max(line.chars().count());
        }
        if widest == 0 {
            return Size::ZERO;
        }
        Size::new(widest as f32 * advance, lines as f32 * Self::line_height(style))
    }

    fn rasterize(&mut self, text: &str, style: &TextStyle) -> GlyphMask {
        let size = self.measure(text, style);
        let mut mask = GlyphMask::new(size.width.ceil() as u32, size.height.ceil() as u32);
        if size.is_empty() || mask.is_empty() {
            return mask;
        }

        let advance = style.font_size;
        let line_height = Self::line_height(style);
        // Glyph box inside each cell.
        let (gx0, gx1) = (advance * 0.1, advance * 0.9);
        let (gy0, gy1) = (line_height * 0.15, line_height * 0.85);

        for (row, line) in text.lines().enumerate() {
            let line_width = line.chars().count() as f32 * advance;
            let origin_x = align_offset(style.align, size.width, line_width);
            let origin_y = row as f32 * line_height;
            for (col, ch) in line.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let x0 = (origin_x + col as f32 * advance + gx0).round() as u32;
                let x1 = (origin_x + col as f32 * advance + gx1).round() as u32;
                let y0 = (origin_y + gy0).round() as u32;
                let y1 = (origin_y + gy1).round() as u32;
                for y in y0..y1 {
                    for x in x0..x1 {
                        mask.set(x, y, 255);
                    }
                }
            }
        }
        mask
    }
}

// ===================================================================
// Tests
// ===================================================================
