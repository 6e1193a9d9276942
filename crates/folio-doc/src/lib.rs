//! Documents for Folio: the indirect-object registry and everything that
//! moves objects through it.
//!
//! A [`PdfDocument`] owns a [`Registry`] of reference slots and, depending on
//! how it was opened, a [`PdfReader`] over an [`ObjectSource`] and a
//! [`PdfWriter`] over an [`ObjectSink`].
//!
//! # Lifecycle
//!
//! - `make_indirect` moves a node into the registry and leaves a reference
//!   node behind.
//! - `flush` hands the content to the writer; afterwards it can be neither
//!   observed nor changed.
//! - `release` drops in-memory content of read objects; `reacquire` reads
//!   it back.
//! - `copy_object_to` duplicates a graph into another document, mapping each
//!   shared source object to exactly one target object.
//!
//! # Collaborators
//!
//! - [`InMemorySource`] / [`InMemorySink`] -- `RwLock`-backed, for tests and
//!   embedding

pub mod config;
pub mod copy;
pub mod document;
pub mod error;
pub mod memory;
pub mod reader;
pub mod registry;
pub mod traits;
pub mod writer;

#[cfg(test)]
mod test_log;

pub use config::DocumentConfig;
pub use document::{CloseReport, PdfDocument};
pub use error::{DocError, DocResult};
pub use memory::{InMemorySink, InMemorySource, WrittenObject};
pub use reader::PdfReader;
pub use registry::{Origin, RefSlot, Registry, RegistryMark};
pub use traits::{ObjectSink, ObjectSource};
pub use writer::{CopiedKey, PdfWriter};
