//! # motion-cli
//!
//! Replays a recorded editing session and exports the result.
//!
//! ```text
//!  session.json ──▸ Session ──▸ replay() ──▸ Compositor ──▸ snapshot ──▸ PNG / JPEG
//!                                  │
//!                     GestureAdapter ◂── PointerRecognizer
//! ```
//!
//! - [`session`] — the JSON session format
//! - [`replay`] — builds the compositor and applies the recorded steps
//! - [`error`] — `CliError`

pub mod error;
pub mod replay;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use motion_render::{Bitmap, BoxShaper, ImageFormat};
use motion_text::TextEngine;

pub use error::CliError;
pub use replay::{replay, RenderMode, Replay};
pub use session::{CanvasSpec, LayerSpec, Session, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Png,
    Jpeg,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ShaperArg {
    /// Fixed-advance boxes; deterministic and font-free.
    Box,
    /// System fonts via cosmic-text.
    #[default]
    System,
}

#[derive(Parser, Debug)]
#[command(
    name = "motion",
    version,
    about = "Replay a text-overlay editing session and export the composition"
)]
pub struct Args {
    /// Session file (JSON).
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,
    /// Output image path.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
    /// Output format.  Inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// JPEG quality (1-100).
    #[arg(long, default_value_t = motion_render::encode::DEFAULT_JPEG_QUALITY)]
    pub quality: u8,
    /// Text shaper.
    #[arg(long, value_enum, default_value_t = ShaperArg::System)]
    pub shaper: ShaperArg,
    /// Render the on-screen frame (with selection) instead of a snapshot.
    #[arg(long)]
    pub frame: bool,
    /// Print the final layers as JSON on stdout.
    #[arg(long)]
    pub dump: bool,
}

impl Args {
    pub fn image_format(&self) -> Result<ImageFormat, CliError> {
        let quality = self.quality.clamp(1, 100);
        match self.format {
            Some(FormatArg::Png) => Ok(ImageFormat::Png),
            Some(FormatArg::Jpeg) => Ok(ImageFormat::Jpeg { quality }),
            None => match ImageFormat::from_path(&self.output) {
                Some(ImageFormat::Jpeg { .. }) => Ok(ImageFormat::Jpeg { quality }),
                Some(format) => Ok(format),
                None => Err(CliError::UnknownFormat(self.output.clone())),
            },
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.frame {
            RenderMode::Frame
        } else {
            RenderMode::Snapshot
        }
    }
}

/// Summary returned by [`run`].
#[derive(Debug)]
pub struct RunReport {
    pub bitmap: Bitmap,
    pub format: ImageFormat,
    /// Final layers, serialised, when `--dump` was given.
    pub dump: Option<String>,
}

/// Load, replay, render and save.
pub fn run(args: &Args) -> Result<RunReport, CliError> {
    let format = args.image_format()?;
    let session = Session::load(&args.session)?;
    log::info!("Loaded {} ({} layers, {} steps)", args.session.display(), session.layers.len(), session.events.len());

    let (bitmap, dump) = match args.shaper {
        ShaperArg::Box => render_with(&session, BoxShaper, args)?,
        ShaperArg::System => {
            let engine = TextEngine::new();
            if !engine.has_fonts() {
                log::warn!("No system fonts found; text will not be visible");
            }
            render_with(&session, engine, args)?
        }
    };

    motion_render::save(&bitmap, format, &args.output)?;
    log::info!(
        "Wrote {}×{} {:?} to {}",
        bitmap.width(),
        bitmap.height(),
        format,
        args.output.display()
    );
    Ok(RunReport { bitmap, format, dump })
}

fn render_with<S: motion_render::TextShaper>(
    session: &Session,
    shaper: S,
    args: &Args,
) -> Result<(Bitmap, Option<String>), CliError> {
    let mut replay = replay(session, shaper)?;
    let dump = if args.dump {
        let layers: Vec<_> = replay.compositor.entities().iter().map(|e| e.content()).collect();
        Some(serde_json::to_string_pretty(&layers)?)
    } else {
        None
    };
    let bitmap = replay.render(args.render_mode())?;
    Ok((bitmap, dump))
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["motion", "session.json"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let a = args(&["-o", "out.png"]);
        assert_eq!(a.shaper, ShaperArg::System);
        assert_eq!(a.quality, 90);
        assert_eq!(a.render_mode(), RenderMode::Snapshot);
        assert_eq!(a.image_format().unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_format_from_extension_uses_quality() {
        let a = args(&["-o", "out.JPG", "--quality", "70"]);
        assert_eq!(a.image_format().unwrap(), ImageFormat::Jpeg { quality: 70 });
    }

    #[test]
    fn test_explicit_format_wins() {
        let a = args(&["-o", "out.bin", "--format", "jpeg", "--shaper", "box", "--frame"]);
        assert_eq!(a.image_format().unwrap(), ImageFormat::Jpeg { quality: 90 });
        assert_eq!(a.shaper, ShaperArg::Box);
        assert_eq!(a.render_mode(), RenderMode::Frame);
    }

    #[test]
    fn test_unknown_extension() {
        let a = args(&["-o", "out.gif"]);
        assert!(matches!(a.image_format(), Err(CliError::UnknownFormat(_))));
    }

    #[test]
    fn test_output_required() {
        assert!(Args::try_parse_from(["motion", "session.json"]).is_err());
    }
}
