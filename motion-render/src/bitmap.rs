//! CPU pixel buffer.
//!
//! Pixels are straight-alpha RGBA8, row-major, top-left origin.  Blending
//! uses integer arithmetic only so identical draw sequences produce
//! identical bytes on every platform.

use bytemuck::{Pod, Zeroable};
use motion_core::Color;

/// Largest pixel count a single bitmap may hold (16384 × 16384).
pub const MAX_PIXELS: u64 = 1 << 28;

/// One RGBA8 pixel.
///
/// `#[repr(C)]` + `Pod` so a `&[Rgba8]` can be viewed as `&[u8]` without
/// copying.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Color> for Rgba8 {
    #[inline(always)]
    fn from(c: Color) -> Self {
        Self { r: c.r, g: c.g, b: c.b, a: c.a }
    }
}

impl From<Rgba8> for Color {
    #[inline(always)]
    fn from(p: Rgba8) -> Self {
        Color::rgba(p.r, p.g, p.b, p.a)
    }
}

#[inline(always)]
fn div255(v: u32) -> u32 {
    (v + 127) / 255
}

impl Rgba8 {
    /// Source-over of `src` with an extra `coverage` factor in `0..=255`.
    #[inline]
    pub fn blend(self, src: Rgba8, coverage: u8) -> Rgba8 {
        let sa = div255(src.a as u32 * coverage as u32);
        if sa == 0 {
            return self;
        }
        if sa == 255 {
            return src;
        }
        let da = self.a as u32;
        let keep = div255(da * (255 - sa));
        let out_a = sa + keep;
        if out_a == 0 {
            return Rgba8::default();
        }
        let channel = |s: u8, d: u8| -> u8 {
            let num = s as u32 * sa + d as u32 * keep;
            ((num + out_a / 2) / out_a).min(255) as u8
        };
        Rgba8 {
            r: channel(src.r, self.r),
            g: channel(src.g, self.g),
            b: channel(src.b, self.b),
            a: out_a.min(255) as u8,
        }
    }
}

/// Owned RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl Bitmap {
    /// Allocate a transparent bitmap.  Returns `None` if the size overflows
    /// [`MAX_PIXELS`] or the allocation fails.
    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        let count = (width as u64).checked_mul(height as u64)?;
        if count > MAX_PIXELS {
            return None;
        }
        let count = usize::try_from(count).ok()?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(count).ok()?;
        pixels.resize(count, Rgba8::default());
        Some(Self { width, height, pixels })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Raw RGBA bytes, `width * height * 4` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize) * (self.width as usize) + x as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i].into())
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color.into());
    }

    /// Blend `color` into `(x, y)` with `coverage`.  Out-of-bounds writes
    /// are dropped.
    #[inline]
    pub fn blend(&mut self, x: u32, y: u32, color: Rgba8, coverage: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = self.pixels[i].blend(color, coverage);
        }
    }

    /// `true` when every pixel has alpha 255.
    pub fn is_opaque(&self) -> bool {
        self.pixels.iter().all(|p| p.a == 255)
    }

    /// Packed RGB bytes with each pixel composited over `background`.
    pub fn to_rgb_over(&self, background: Color) -> Vec<u8> {
        let bg = Rgba8::from(Color { a: 255, ..background });
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            let c = bg.blend(*p, 255);
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
        out
    }
}

// ===================================================================
// Tests
// ===================================================================
