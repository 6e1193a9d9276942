use crate::object::PdfObject;

/// A typed view over a node (a page, a destination, an outline item).
///
/// Wrappers whose node needs document-level identity report it through
/// [`wrapped_must_be_indirect`](Self::wrapped_must_be_indirect); the node is
/// then flagged MUST_BE_INDIRECT at construction, so the wrapper can be built
/// before any document is open.
pub trait ObjectWrapper: Sized {
    /// Whether the wrapped node must end up as an indirect object.
    fn wrapped_must_be_indirect() -> bool;

    fn object(&self) -> &PdfObject;

    fn into_object(self) -> PdfObject;

    /// Prepare `object` for wrapping.
    fn wrap_object(mut object: PdfObject) -> PdfObject {
        if Self::wrapped_must_be_indirect() {
            object.mark_must_be_indirect();
        }
        object
    }
}
