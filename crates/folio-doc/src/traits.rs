use std::io;

use folio_object::{DocumentId, IndirectReference, ObjectKey, PdfObject};

/// Source of objects for a document opened for reading.
///
/// This is the tokenizer/parser side of a file format. Implementations
/// decode whatever representation they hold into nodes; the document
/// decides when to ask.
pub trait ObjectSource {
    /// Every object the source can produce.
    fn keys(&self) -> Vec<ObjectKey>;

    /// Decode the object stored under `key`.
    ///
    /// Reference nodes inside the returned content must belong to
    /// `document`. Returns `Ok(None)` if the source has no such object.
    fn read_object(&self, key: ObjectKey, document: DocumentId) -> io::Result<Option<PdfObject>>;

    /// Whether the source grants full access (owner password or no
    /// encryption). Copying out of a restricted source is refused.
    fn is_opened_with_full_permission(&self) -> bool {
        true
    }

    /// Whether `key` names an object stream of the original file.
    fn is_object_stream(&self, _key: ObjectKey) -> bool {
        false
    }
}

/// Destination for flushed objects of a document opened for writing.
///
/// This is the serializer side of a file format.
pub trait ObjectSink {
    /// Persist one indirect object.
    ///
    /// `in_object_stream` is a policy hint: the object may be packed into an
    /// object stream. A failing write leaves the object unflushed.
    fn write_object(
        &mut self,
        reference: IndirectReference,
        object: &PdfObject,
        in_object_stream: bool,
    ) -> io::Result<()>;

    /// Called once when the document is closed.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}
