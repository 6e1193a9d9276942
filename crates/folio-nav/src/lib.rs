//! Navigation objects for Folio.
//!
//! An explicit destination names a page and a way of fitting it in the
//! viewer window. See [`ExplicitDestination`].

pub mod destination;

pub use destination::{DestinationTarget, ExplicitDestination};
