//! PNG / JPEG export of a [`Bitmap`].

use std::io::Write;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageBuffer, Rgb, Rgba};
use motion_core::Color;
use thiserror::Error;

use crate::bitmap::Bitmap;

/// Default JPEG quality (1–100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Cannot encode an empty {0}×{1} bitmap")]
    Empty(u32, u32),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    /// Alpha is flattened over white.
    Jpeg { quality: u8 },
}

impl ImageFormat {
    pub const JPEG: ImageFormat = ImageFormat::Jpeg { quality: DEFAULT_JPEG_QUALITY };

    /// Guess from a file extension (`png`, `jpg`, `jpeg`; any case).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::JPEG),
            _ => None,
        }
    }
}

/// Encode `bitmap` into `writer`.
pub fn encode<W: Write>(bitmap: &Bitmap, format: ImageFormat, writer: W) -> Result<(), EncodeError> {
    let (w, h) = (bitmap.width(), bitmap.height());
    if w == 0 || h == 0 {
        return Err(EncodeError::Empty(w, h));
    }
    match format {
        ImageFormat::Png => {
            let img: ImageBuffer<Rgba<u8>, &[u8]> = ImageBuffer::from_raw(w, h, bitmap.as_bytes())
                .ok_or(EncodeError::Empty(w, h))?;
            img.write_with_encoder(PngEncoder::new(writer))?;
        }
        ImageFormat::Jpeg { quality } => {
            let rgb: ImageBuffer<Rgb<u8>, Vec<u8>> =
                ImageBuffer::from_raw(w, h, bitmap.to_rgb_over(Color::WHITE))
                    .ok_or(EncodeError::Empty(w, h))?;
            let quality = quality.clamp(1, 100);
            rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))?;
        }
    }
    log::debug!("encode: {w}×{h} as {format:?}");
    Ok(())
}

/// Encode into a fresh byte vector.
pub fn encode_to_vec(bitmap: &Bitmap, format: ImageFormat) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode(bitmap, format, &mut out)?;
    Ok(out)
}

/// Encode and write to `path`.
pub fn save(bitmap: &Bitmap, format: ImageFormat, path: &Path) -> Result<(), EncodeError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    encode(bitmap, format, &mut writer)?;
    writer.flush()?;
    Ok(())
}
