//! Text engine — shapes text and rasterizes glyphs using `cosmic-text`.
//!
//! The engine owns a `FontSystem` (font discovery + shaping) and a
//! `SwashCache` (glyph rasterization).  A whole layer is shaped at scale 1
//! and flattened into one [`GlyphMask`]; the raster surface handles the
//! layer transform.  Shaped results are kept in an LRU keyed by text and
//! style, so re-measuring or re-drawing an unchanged caption is free.

use std::num::NonZeroUsize;

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style as CStyle, SwashCache,
    SwashContent, Weight,
};
use lru::LruCache;
use motion_core::{Size, TextStyle};
use motion_render::shaper::align_offset;
use motion_render::{GlyphMask, TextShaper};

/// Default number of shaped layers kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Cache key: everything that affects shaping.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ShapeKey {
    text: String,
    font: String,
    font_size: u32,
    line_height: u32,
    weight: u16,
    italic: bool,
    align: motion_core::TextAlign,
}

impl ShapeKey {
    fn new(text: &str, style: &TextStyle) -> Self {
        Self {
            text: text.to_owned(),
            font: style.font.clone(),
            font_size: style.font_size.to_bits(),
            line_height: style.line_height.to_bits(),
            weight: style.weight,
            italic: style.italic,
            align: style.align,
        }
    }
}

/// Map a font identifier (possibly a CSS-style chain) onto a cosmic-text
/// family.  Only the first entry of a chain is used; cosmic-text falls
/// back on its own when it is missing.
fn family_of(font: &str) -> Family<'_> {
    let first = font
        .split(',')
        .next()
        .unwrap_or(font)
        .trim()
        .trim_matches('"')
        .trim_matches('\'');
    match first {
        "" | "sans-serif" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        name => Family::Name(name),
    }
}

/// Text shaper backed by system fonts.
pub struct TextEngine {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
    sizes: LruCache<ShapeKey, Size>,
    masks: LruCache<ShapeKey, GlyphMask>,
}

impl TextEngine {
    /// Create an engine with system font discovery.
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new(), DEFAULT_CACHE_CAPACITY)
    }

    /// Create an engine around an existing font system (e.g. one with
    /// fonts loaded from memory).
    pub fn with_font_system(font_system: FontSystem, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        log::debug!(
            "TextEngine: {} font faces, cache capacity {capacity}",
            font_system.db().faces().count()
        );
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            sizes: LruCache::new(capacity),
            masks: LruCache::new(capacity),
        }
    }

    /// `true` when at least one font face was discovered.
    pub fn has_fonts(&self) -> bool {
        self.font_system.db().faces().count() > 0
    }

    /// Number of rasterised layers currently cached.
    pub fn cached_masks(&self) -> usize {
        self.masks.len()
    }

    pub fn clear_cache(&mut self) {
        self.sizes.clear();
        self.masks.clear();
    }

    fn shape(&mut self, text: &str, style: &TextStyle) -> Buffer {
        let metrics = Metrics::new(style.font_size.max(1.0), style.line_height.max(1.0));
        let font_style = if style.italic { CStyle::Italic } else { CStyle::Normal };
        let attrs = Attrs::new()
            .family(family_of(&style.font))
            .weight(Weight(style.weight))
            .style(font_style);

        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    fn measure_buffer(buffer: &Buffer, style: &TextStyle) -> Size {
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height = height.max(run.line_top + style.line_height);
        }
        if width <= 0.0 {
            return Size::ZERO;
        }
        Size::new(width.ceil(), height.ceil())
    }
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper for TextEngine {
    fn measure(&mut self, text: &str, style: &TextStyle) -> Size {
        let key = ShapeKey::new(text, style);
        if let Some(size) = self.sizes.get(&key) {
            return *size;
        }
        let buffer = self.shape(text, style);
        let size = Self::measure_buffer(&buffer, style);
        self.sizes.put(key, size);
        size
    }

    fn rasterize(&mut self, text: &str, style: &TextStyle) -> GlyphMask {
        let key = ShapeKey::new(text, style);
        if let Some(mask) = self.masks.get(&key) {
            return mask.clone();
        }

        let buffer = self.shape(text, style);
        let size = Self::measure_buffer(&buffer, style);
        let mut mask = GlyphMask::new(size.width as u32, size.height as u32);
        if mask.is_empty() {
            return mask;
        }

        // Iterate layout runs → glyphs.
        for run in buffer.layout_runs() {
            let offset = align_offset(style.align, size.width, run.line_w).max(0.0);
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((offset, 0.0), 1.0);

                // Rasterize via swash.
                let image = match self.swash_cache.get_image(&mut self.font_system, physical.cache_key) {
                    Some(img) => img,
                    None => continue, // whitespace or missing glyph
                };
                let placement = image.placement;
                if placement.width == 0 || placement.height == 0 {
                    continue;
                }

                let origin_x = physical.x + placement.left;
                let origin_y = run.line_y as i32 + physical.y - placement.top;
                let stride = match image.content {
                    SwashContent::Mask => 1,
                    SwashContent::SubpixelMask | SwashContent::Color => 4,
                };

                for gy in 0..placement.height {
                    for gx in 0..placement.width {
                        let i = ((gy * placement.width + gx) as usize) * stride;
                        let coverage = match image.content {
                            SwashContent::Mask => image.data[i],
                            // Alpha channel only.
                            SwashContent::Color => image.data[i + 3],
                            SwashContent::SubpixelMask => {
                                let sum = image.data[i] as u16 + image.data[i + 1] as u16 + image.data[i + 2] as u16;
                                (sum / 3) as u8
                            }
                        };
                        if coverage == 0 {
                            continue;
                        }
                        let x = origin_x + gx as i32;
                        let y = origin_y + gy as i32;
                        if x < 0 || y < 0 {
                            continue;
                        }
                        let (x, y) = (x as u32, y as u32);
                        let merged = mask.get(x, y).max(coverage);
                        mask.set(x, y, merged);
                    }
                }
            }
        }

        log::trace!("TextEngine: rasterised {:?} into {}×{}", text, mask.width, mask.height);
        self.masks.put(key, mask.clone());
        mask
    }
}

// ===================================================================
// Tests
// ===================================================================
