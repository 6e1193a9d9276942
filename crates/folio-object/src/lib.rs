//! Object model for Folio.
//!
//! This crate defines the nodes of a PDF-like document graph: scalars,
//! arrays, dictionaries and streams, plus the lifecycle bookkeeping every
//! node carries (its optional indirect reference and its state bits).
//!
//! # Key Types
//!
//! - [`PdfObject`]: a node, holding a [`PdfValue`] plus binding and [`ObjectState`]
//! - [`IndirectReference`]: handle to a slot of a document registry
//! - [`PdfArray`], [`PdfDictionary`], [`PdfStream`]: containers owning their children
//! - [`Resolver`]: the seam through which containers follow references
//!
//! Registries live in `folio-doc`; nothing here owns an indirect object.

pub mod array;
pub mod dictionary;
pub mod error;
pub mod object;
pub mod rectangle;
pub mod reference;
pub mod resolve;
pub mod scalar;
pub mod state;
pub mod stream;
pub mod wrapper;

pub use array::PdfArray;
pub use dictionary::PdfDictionary;
pub use error::{ObjectError, ObjectResult};
pub use object::{ObjectKind, PdfObject, PdfValue};
pub use rectangle::Rectangle;
pub use reference::{DocumentId, IndirectReference, ObjectKey};
pub use resolve::{Detached, Resolver};
pub use scalar::{PdfLiteral, PdfName, PdfNumber, PdfString};
pub use state::ObjectState;
pub use stream::PdfStream;
pub use wrapper::ObjectWrapper;
