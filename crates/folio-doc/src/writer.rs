use std::collections::HashMap;
use std::io;

use folio_object::{DocumentId, IndirectReference, ObjectKey, PdfObject};

use crate::traits::ObjectSink;

/// Identity of a source object that has been copied into this document.
pub type CopiedKey = (DocumentId, ObjectKey);

/// Write side of a document.
///
/// Besides the sink, the writer owns the copied-objects table: for every
/// source object copied into the document, the reference of its counterpart.
/// The table outlives single copy calls, so copying two pages that share a
/// resource dictionary one after the other still yields one dictionary.
pub struct PdfWriter {
    sink: Box<dyn ObjectSink>,
    copied: HashMap<CopiedKey, IndirectReference>,
}

impl PdfWriter {
    /// Write to `sink`, with an empty copied-objects table.
    pub fn new(sink: impl ObjectSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            copied: HashMap::new(),
        }
    }

    /// Hand one object to the sink.
    pub fn write(
        &mut self,
        reference: IndirectReference,
        object: &PdfObject,
        in_object_stream: bool,
    ) -> io::Result<()> {
        self.sink.write_object(reference, object, in_object_stream)
    }

    /// Tell the sink that no more objects follow.
    pub fn finish(&mut self) -> io::Result<()> {
        self.sink.finish()
    }

    /// Counterpart of `source`, if it has been copied here before.
    pub fn copied(&self, source: IndirectReference) -> Option<IndirectReference> {
        self.copied.get(&copied_key(source)).copied()
    }

    /// Record `target` as the counterpart of `source`. Returns the previous
    /// counterpart, if any.
    pub(crate) fn record_copy(
        &mut self,
        source: IndirectReference,
        target: IndirectReference,
    ) -> Option<IndirectReference> {
        self.copied.insert(copied_key(source), target)
    }

    /// Undo a [`record_copy`](Self::record_copy).
    pub(crate) fn restore_copy(&mut self, source: IndirectReference, previous: Option<IndirectReference>) {
        match previous {
            Some(target) => self.copied.insert(copied_key(source), target),
            None => self.copied.remove(&copied_key(source)),
        };
    }

    /// Number of entries in the copied-objects table.
    pub fn copied_len(&self) -> usize {
        self.copied.len()
    }
}

fn copied_key(reference: IndirectReference) -> CopiedKey {
    (reference.document(), reference.key())
}
