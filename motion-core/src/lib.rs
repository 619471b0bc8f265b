//! # motion-core
//!
//! Entity model and compositor for the text-overlay editor.
//!
//! ## Architecture
//!
//! ```text
//!  GestureAdapter (motion-gesture)
//!       │  commands
//!       ▼
//!  Compositor ──── stack of Entity { EntityContent::Text(TextLayer { Transform }) }
//!       │  draw / snapshot
//!       ▼
//!  RenderSurface (motion-render, or any backend)
//! ```
//!
//! ## Crate modules
//!
//! - [`geometry`] — points, sizes, quads and 2-D affine matrices
//! - [`transform`] — normalised-centre transform with scale/rotation/flip
//! - [`layer`] — text payload, style and the `EntityContent` variants
//! - [`surface`] — the drawing backend contract
//! - [`entity`] — a layer plus selection state and surface resources
//! - [`compositor`] — z-ordered stack, selection, hit testing, snapshots
//! - [`config`] — tunables loaded by the host application
//! - [`error`] — error kinds

pub mod compositor;
pub mod config;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod surface;
pub mod transform;

// Re-exports for convenience
pub use compositor::{Compositor, CompositorEvent};
pub use config::CompositorConfig;
pub use entity::{Entity, EntityId};
pub use error::{CompositorError, ErrorKind};
pub use geometry::{Affine, Point, Quad, Size};
pub use layer::{Color, EntityContent, TextAlign, TextLayer, TextStyle};
pub use surface::{BorderStyle, OverlayStyle, RenderSurface, ResourceSlot};
pub use transform::{Transform, TransformLimits};
