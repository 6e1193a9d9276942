use std::io;

use folio_object::{DocumentId, ObjectKey, PdfObject};

use crate::traits::ObjectSource;

/// Read side of a document: the source plus what the document asks of it.
pub struct PdfReader {
    source: Box<dyn ObjectSource>,
}

impl PdfReader {
    /// Read from `source`.
    pub fn new(source: impl ObjectSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Keys of every object the source defines.
    pub fn keys(&self) -> Vec<ObjectKey> {
        self.source.keys()
    }

    /// Read the definition of `key`, with references attached to `document`.
    pub fn read(&self, key: ObjectKey, document: DocumentId) -> io::Result<Option<PdfObject>> {
        self.source.read_object(key, document)
    }

    /// Whether copying out of the source is permitted.
    pub fn is_opened_with_full_permission(&self) -> bool {
        self.source.is_opened_with_full_permission()
    }

    /// Whether `key` is stored in an object stream of the source.
    pub fn is_object_stream(&self, key: ObjectKey) -> bool {
        self.source.is_object_stream(key)
    }
}
