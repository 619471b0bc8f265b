//! # motion-gesture
//!
//! Input side of the overlay editor: turns pointer streams into gestures
//! and gestures into compositor commands.
//!
//! ## Architecture
//!
//! ```text
//!  PointerEvent ──▸ PointerRecognizer ──GestureEvent──▸ GestureAdapter ──▸ Compositor
//!                     (GestureSource)        ▲
//!                                            │
//!                  QueuedGestures ───────────┘  (replayed / synthetic input)
//! ```
//!
//! ## Crate modules
//!
//! - [`event`] — `GestureEvent`, the `GestureSource` trait and a FIFO source
//! - [`recognizer`] — pointer tracking: taps, long press, drag, pinch, twist
//! - [`adapter`] — gesture → compositor dispatch table
//! - [`config`] — recogniser thresholds

pub mod adapter;
pub mod config;
pub mod event;
pub mod recognizer;

// Re-exports for convenience
pub use adapter::{DispatchResult, GestureAdapter};
pub use config::RecognizerConfig;
pub use event::{GestureEvent, GestureSource, QueuedGestures};
pub use recognizer::{PointerEvent, PointerRecognizer};
