use std::path::PathBuf;

use motion_core::CompositorError;
use motion_render::EncodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid session file: {0}")]
    Session(#[from] serde_json::Error),
    #[error("Invalid canvas {width}×{height}")]
    InvalidCanvas { width: u32, height: u32 },
    #[error("Layer {index}: font size {font_size} / line height {line_height} out of range")]
    InvalidStyle {
        index: usize,
        font_size: f32,
        line_height: f32,
    },
    #[error("Cannot infer image format from {0}; pass --format")]
    UnknownFormat(PathBuf),
    #[error("Compositor error: {0}")]
    Compositor(#[from] CompositorError),
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
}
