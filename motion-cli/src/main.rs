//! `motion` — replay a text-overlay session and export the composition.
//!
//! ```text
//! motion session.json -o meme.jpg
//! motion session.json -o frame.png --frame --shaper box
//! RUST_LOG=debug motion session.json -o out.png --dump
//! ```

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use motion_cli::{run, Args};

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    info!("Starting motion ({:?} shaper)...", args.shaper);

    match run(&args) {
        Ok(report) => {
            if let Some(dump) = report.dump {
                println!("{dump}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("motion: {e}");
            ExitCode::FAILURE
        }
    }
}
