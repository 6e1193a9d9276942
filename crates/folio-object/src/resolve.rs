use crate::object::PdfObject;
use crate::reference::IndirectReference;

/// Looks up the live node an indirect reference is bound to.
///
/// Implemented by documents. Containers take a resolver so that their
/// accessors can follow references without owning the registry.
pub trait Resolver {
    /// The node currently bound to `reference`, if it is loaded.
    fn resolve(&self, reference: &IndirectReference) -> Option<&PdfObject>;
}

/// A resolver for nodes that are not attached to any document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl Resolver for Detached {
    fn resolve(&self, _reference: &IndirectReference) -> Option<&PdfObject> {
        None
    }
}
