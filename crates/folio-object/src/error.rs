use thiserror::Error;

use crate::object::ObjectKind;

/// Errors produced by node and container operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObjectError {
    /// An array could not be read as `[x1 y1 x2 y2]`.
    #[error("cannot convert array to rectangle: {reason}")]
    MalformedRectangle { reason: String },

    /// The node was released from its reference and is read-only.
    #[error("object was released and can no longer be modified")]
    UseAfterRelease,

    /// Content was copied between nodes of different kinds.
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// Positional access outside the array bounds.
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Result alias for object operations.
pub type ObjectResult<T> = Result<T, ObjectError>;
