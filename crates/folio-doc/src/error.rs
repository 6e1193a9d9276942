//! Error types for document operations.

use folio_object::{IndirectReference, ObjectError};
use thiserror::Error;

/// Errors that can occur while managing a document's object graph.
///
/// Every kind signals API misuse or a document-integrity violation; none is
/// transient, and none is retried or swallowed by this crate.
#[derive(Debug, Error)]
pub enum DocError {
    /// Indirection or flushing attempted on a document without a writer.
    #[error("there is no associated writer for making indirect objects")]
    NoWriter,

    /// Copy source is an object of a document that is being written.
    #[error("cannot copy indirect object {reference:?} from a document that is being written")]
    NoCopyFromWriteTarget { reference: Option<IndirectReference> },

    /// The source reader was not opened with full (owner) permissions.
    #[error("reader is not opened with owner password")]
    Permission,

    /// Copy from, or mutation of, an object that has already been flushed.
    #[error("cannot copy flushed object {reference}")]
    CannotCopyFlushedObject { reference: IndirectReference },

    /// Observation of an object that has already been flushed.
    #[error("object {reference} has been flushed and its content is no longer available")]
    ObjectFlushed { reference: IndirectReference },

    /// Copy into a document opened for reading only.
    #[error("cannot copy to document opened in reading mode")]
    NoWriterOnTarget,

    /// The reference has no slot in this document's registry.
    #[error("unknown indirect reference {0}")]
    UnknownReference(IndirectReference),

    /// The reference belongs to another document.
    #[error("indirect reference {0} belongs to another document")]
    ForeignReference(IndirectReference),

    /// The writer failed to persist an object.
    #[error("cannot flush object {reference}: {source}")]
    CannotFlushObject {
        reference: IndirectReference,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure from a reader or writer collaborator.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A node-level operation failed.
    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// Result alias for document operations.
pub type DocResult<T> = Result<T, DocError>;
