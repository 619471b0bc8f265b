//! Replays a [`Session`] into a compositor and renders the result.

use motion_core::{Compositor, Entity, RenderSurface, Size};
use motion_gesture::{DispatchResult, GestureAdapter, PointerRecognizer};
use motion_render::{Bitmap, RasterSurface, TextShaper};

use crate::error::CliError;
use crate::session::{Session, Step};

/// What to render once the events have been applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Export snapshot: opaque background, no selection decoration.
    #[default]
    Snapshot,
    /// On-screen frame: selection wash and border included.
    Frame,
}

/// A compositor after replay, with the surface it was measured against.
pub struct Replay<S: TextShaper> {
    pub compositor: Compositor,
    pub surface: RasterSurface<S>,
    pub dispatch: DispatchResult,
}

impl<S: TextShaper> std::fmt::Debug for Replay<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replay")
            .field("entities", &self.compositor.len())
            .field("selected", &self.compositor.selected())
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

/// Build the compositor, add the layers and apply every step in order.
pub fn replay<S: TextShaper>(session: &Session, shaper: S) -> Result<Replay<S>, CliError> {
    let (width, height) = (session.canvas.width, session.canvas.height);
    let mut surface = RasterSurface::new(width, height, shaper)?;
    let mut compositor = Compositor::with_config(
        Size::new(width as f32, height as f32),
        session.compositor.clone(),
    );

    for spec in &session.layers {
        let entity = Entity::new(spec.to_layer());
        let id = match spec.transform {
            None => compositor.add_and_place(&mut surface, entity)?,
            Some(_) => compositor.add(&mut surface, entity)?,
        };
        if spec.select {
            compositor.select(Some(id), false)?;
        }
    }
    log::info!("Replay: {} layers on a {width}×{height} canvas", compositor.len());

    let rotation = session.recognizer.rotation_enabled;
    let mut adapter = GestureAdapter::new().with_rotation(rotation);
    let mut recognizer = PointerRecognizer::new(session.recognizer.clone());
    let mut dispatch = DispatchResult::default();

    for step in &session.events {
        match *step {
            Step::Gesture(event) => {
                dispatch.total += 1;
                if adapter.dispatch(&mut compositor, event) {
                    dispatch.applied += 1;
                } else {
                    dispatch.ignored += 1;
                }
            }
            Step::Pointer(event) => {
                recognizer.feed(event);
                merge(&mut dispatch, adapter.pump(&mut recognizer, &mut compositor));
            }
            Step::Tick { tick_ms } => {
                recognizer.tick(tick_ms);
                merge(&mut dispatch, adapter.pump(&mut recognizer, &mut compositor));
            }
        }
    }
    log::info!(
        "Replay: {} steps produced {} gestures ({} applied)",
        session.events.len(),
        dispatch.total,
        dispatch.applied
    );

    Ok(Replay {
        compositor,
        surface,
        dispatch,
    })
}

fn merge(into: &mut DispatchResult, from: DispatchResult) {
    into.total += from.total;
    into.applied += from.applied;
    into.ignored += from.ignored;
}

impl<S: TextShaper> Replay<S> {
    /// Render the current composition.  `Snapshot` clears the selection.
    pub fn render(&mut self, mode: RenderMode) -> Result<Bitmap, CliError> {
        match mode {
            RenderMode::Snapshot => Ok(self.compositor.snapshot(&self.surface)?.into_bitmap()),
            RenderMode::Frame => {
                self.surface.clear(self.compositor.config().background);
                self.compositor.draw(&mut self.surface);
                Ok(self.surface.bitmap().clone())
            }
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
