//! Software [`RenderSurface`] backed by a [`Bitmap`].
//!
//! Text is rasterised once per layer revision into a [`GlyphMask`] at
//! scale 1 and cached in the entity's [`ResourceSlot`].  Each draw then
//! walks the device-space bounds of the transformed layer and samples the
//! mask through the inverse matrix, so scale, rotation and flips cost no
//! re-rasterisation.

use std::cell::RefCell;
use std::rc::Rc;

use motion_core::geometry::Aabb;
use motion_core::{
    Affine, BorderStyle, Color, CompositorError, Point, Quad, RenderSurface, ResourceSlot, Size,
    TextLayer, TextStyle,
};

use crate::bitmap::{Bitmap, Rgba8};
use crate::shaper::{GlyphMask, TextShaper};

/// Mask cached per entity, tagged with the layer revision it was built
/// from.
struct CachedMask {
    revision: u64,
    mask: GlyphMask,
}

/// CPU drawing surface.
///
/// The shaper is shared with every offscreen surface created from this
/// one, so font caches survive across snapshots.
pub struct RasterSurface<S: TextShaper> {
    bitmap: Bitmap,
    shaper: Rc<RefCell<S>>,
    /// Current transform followed by the saved ones.
    current: Affine,
    saved: Vec<Affine>,
}

impl<S: TextShaper> RasterSurface<S> {
    /// Allocate a transparent `width × height` surface.
    pub fn new(width: u32, height: u32, shaper: S) -> Result<Self, CompositorError> {
        Self::with_shared_shaper(width, height, Rc::new(RefCell::new(shaper)))
    }

    pub fn with_shared_shaper(
        width: u32,
        height: u32,
        shaper: Rc<RefCell<S>>,
    ) -> Result<Self, CompositorError> {
        let bitmap = Bitmap::try_new(width, height).ok_or_else(|| {
            log::warn!("RasterSurface: cannot allocate {width}×{height}");
            CompositorError::ResourceExhausted { width, height }
        })?;
        Ok(Self {
            bitmap,
            shaper,
            current: Affine::IDENTITY,
            saved: Vec::new(),
        })
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }

    pub fn shaper(&self) -> &Rc<RefCell<S>> {
        &self.shaper
    }

    /// Current local-to-device matrix.
    pub fn current_transform(&self) -> Affine {
        self.current
    }

    /// Pixel box covering `bounds`, clipped to the bitmap.  `None` when
    /// the two do not overlap.
    fn clip(&self, bounds: Aabb) -> Option<(u32, u32, u32, u32)> {
        let w = self.bitmap.width() as f32;
        let h = self.bitmap.height() as f32;
        if !(bounds.max_x > 0.0 && bounds.max_y > 0.0 && bounds.min_x < w && bounds.min_y < h) {
            return None;
        }
        let x0 = bounds.min_x.floor().max(0.0) as u32;
        let y0 = bounds.min_y.floor().max(0.0) as u32;
        let x1 = bounds.max_x.ceil().min(w) as u32;
        let y1 = bounds.max_y.ceil().min(h) as u32;
        Some((x0, y0, x1, y1))
    }

    fn paint_mask(&mut self, mask: &GlyphMask, color: Color) {
        if mask.is_blank() {
            return;
        }
        let Some(inverse) = self.current.inverse() else {
            return;
        };
        let local = Size::new(mask.width as f32, mask.height as f32);
        let quad = Quad::from_local(local, &self.current);
        let Some((x0, y0, x1, y1)) = self.clip(quad.bounds()) else {
            return;
        };
        let src = Rgba8::from(color);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = inverse.apply(Point::new(x as f32 + 0.5, y as f32 + 0.5));
                let coverage = mask.sample(p.x, p.y);
                if coverage > 0 {
                    self.bitmap.blend(x, y, src, coverage);
                }
            }
        }
    }
}

/// Distance from `p` to the segment `a`–`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len2 = ab.x * ab.x + ab.y * ab.y;
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + ab.x * t, a.y + ab.y * t))
}

impl<S: TextShaper> RenderSurface for RasterSurface<S> {
    fn size(&self) -> Size {
        Size::new(self.bitmap.width() as f32, self.bitmap.height() as f32)
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> Size {
        self.shaper.borrow_mut().measure(text, style)
    }

    fn push_transform(&mut self, m: Affine) {
        self.saved.push(self.current);
        self.current = self.current * m;
    }

    fn pop_transform(&mut self) {
        match self.saved.pop() {
            Some(m) => self.current = m,
            None => log::warn!("RasterSurface: pop_transform on empty stack"),
        }
    }

    fn draw_text(&mut self, layer: &TextLayer, slot: &mut ResourceSlot) {
        let color = layer.style().color;
        let cached = slot
            .get::<CachedMask>()
            .filter(|c| c.revision == layer.revision())
            .map(|c| &c.mask);
        if let Some(mask) = cached {
            self.paint_mask(mask, color);
            return;
        }

        let mask = self.shaper.borrow_mut().rasterize(layer.text(), layer.style());
        log::trace!(
            "RasterSurface: rasterised {:?} → {}×{}",
            layer.text(),
            mask.width,
            mask.height
        );
        self.paint_mask(&mask, color);
        slot.insert(CachedMask {
            revision: layer.revision(),
            mask,
        });
    }

    fn fill_quad(&mut self, quad: &Quad, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(quad.bounds()) else {
            return;
        };
        let src = Rgba8::from(color);
        for y in y0..y1 {
            for x in x0..x1 {
                if quad.contains(Point::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.bitmap.blend(x, y, src, 255);
                }
            }
        }
    }

    fn stroke_quad(&mut self, quad: &Quad, border: &BorderStyle) {
        let half = (border.width * 0.5).max(0.5);
        let mut bounds = quad.bounds();
        bounds.min_x -= half;
        bounds.min_y -= half;
        bounds.max_x += half;
        bounds.max_y += half;
        let Some((x0, y0, x1, y1)) = self.clip(bounds) else {
            return;
        };
        let src = Rgba8::from(border.color);
        let c = &quad.corners;
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let on_edge = (0..4).any(|i| segment_distance(p, c[i], c[(i + 1) % 4]) <= half);
                if on_edge {
                    self.bitmap.blend(x, y, src, 255);
                }
            }
        }
    }

    fn clear(&mut self, color: Color) {
        self.bitmap.fill(color);
    }

    fn create_offscreen(&self, width: u32, height: u32) -> Result<Self, CompositorError> {
        Self::with_shared_shaper(width, height, Rc::clone(&self.shaper))
    }
}

// ===================================================================
// Tests
// ===================================================================
