use thiserror::Error;

use crate::entity::EntityId;

/// Coarse classification of [`CompositorError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A command referenced an unknown entity, re-added a known one, or
    /// asked for an out-of-range value explicitly.  Programmer error.
    InvalidArgument,
    /// An offscreen surface could not be allocated.
    ResourceExhausted,
    /// `release()` was called on an already released entity.  Programmer error.
    DoubleRelease,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositorError {
    #[error("Entity already in the stack: {0}")]
    DuplicateEntity(EntityId),
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),
    #[error("Scale {scale} outside [{min}, {max}]")]
    ScaleOutOfRange { scale: f32, min: f32, max: f32 },
    #[error("Offscreen allocation failed ({width}×{height})")]
    ResourceExhausted { width: u32, height: u32 },
    #[error("Entity released twice: {0}")]
    DoubleRelease(EntityId),
}

impl CompositorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateEntity(_) | Self::EntityNotFound(_) | Self::ScaleOutOfRange { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            Self::DoubleRelease(_) => ErrorKind::DoubleRelease,
        }
    }

    /// `true` for errors that indicate a bug in the caller rather than an
    /// environmental failure.
    pub fn is_programmer_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::ResourceExhausted)
    }
}
