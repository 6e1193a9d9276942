use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use folio_object::{DocumentId, IndirectReference, ObjectKey, ObjectResult, PdfObject};

use crate::traits::{ObjectSink, ObjectSource};

/// In-memory object source.
///
/// Intended for tests and embedding. Objects are held behind a shared
/// `RwLock`, so a clone of the source observes the same table and the same
/// read counter after the original has been handed to a document.
///
/// Reference nodes inside stored objects may carry any document id; they are
/// rebased onto the reading document when the object is read.
#[derive(Clone, Default)]
pub struct InMemorySource {
    objects: Arc<RwLock<BTreeMap<ObjectKey, PdfObject>>>,
    object_streams: Arc<RwLock<BTreeSet<ObjectKey>>>,
    restricted: bool,
    reads: Arc<AtomicUsize>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that refuses copying (no owner password).
    pub fn restricted() -> Self {
        Self {
            restricted: true,
            ..Self::default()
        }
    }

    /// Store `object` under `number`, generation 0.
    pub fn with_object(self, number: u32, object: PdfObject) -> Self {
        self.insert(ObjectKey::new(number, 0), object);
        self
    }

    /// Store `object` under `key`, replacing any previous entry.
    pub fn insert(&self, key: ObjectKey, object: PdfObject) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, object);
    }

    /// Flag `key` as an object stream of the original file.
    pub fn mark_object_stream(&self, key: ObjectKey) {
        self.object_streams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times `read_object` has produced an object.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ObjectSource for InMemorySource {
    fn keys(&self) -> Vec<ObjectKey> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        map.keys().copied().collect()
    }

    fn read_object(&self, key: ObjectKey, document: DocumentId) -> io::Result<Option<PdfObject>> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = map.get(&key) else {
            return Ok(None);
        };
        let object = rebase(stored, document).map_err(io::Error::other)?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Some(object))
    }

    fn is_opened_with_full_permission(&self) -> bool {
        !self.restricted
    }

    fn is_object_stream(&self, key: ObjectKey) -> bool {
        self.object_streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
    }
}

/// Fresh copy of `object` whose reference nodes point into `document`.
fn rebase(object: &PdfObject, document: DocumentId) -> ObjectResult<PdfObject> {
    if let Some(r) = object.as_reference() {
        let moved = IndirectReference::new(document, r.object_number(), r.generation());
        return Ok(PdfObject::reference(moved));
    }
    let mut copy = object.new_instance();
    copy.copy_content(object, |child| rebase(child, document))?;
    Ok(copy)
}

/// One object received by an [`InMemorySink`].
#[derive(Debug)]
pub struct WrittenObject {
    pub reference: IndirectReference,
    pub object: PdfObject,
    pub in_object_stream: bool,
}

/// In-memory object sink.
///
/// Clones share the same buffer, so a test can keep a handle while the
/// document owns another. Writes can be made to fail on demand.
#[derive(Clone, Default)]
pub struct InMemorySink {
    written: Arc<RwLock<Vec<WrittenObject>>>,
    failing: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `write_object` fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.written.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// References in write order.
    pub fn references(&self) -> Vec<IndirectReference> {
        let written = self.written.read().unwrap_or_else(PoisonError::into_inner);
        written.iter().map(|w| w.reference).collect()
    }

    /// Run `f` over everything written so far.
    pub fn with_written<T>(&self, f: impl FnOnce(&[WrittenObject]) -> T) -> T {
        let written = self.written.read().unwrap_or_else(PoisonError::into_inner);
        f(&written)
    }

    /// Whether the object-stream hint was set when `reference` was written.
    pub fn in_object_stream(&self, reference: IndirectReference) -> Option<bool> {
        self.with_written(|written| {
            written
                .iter()
                .find(|w| w.reference == reference)
                .map(|w| w.in_object_stream)
        })
    }

    /// Whether `finish` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl ObjectSink for InMemorySink {
    fn write_object(
        &mut self,
        reference: IndirectReference,
        object: &PdfObject,
        in_object_stream: bool,
    ) -> io::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::other(format!("write of {reference} refused")));
        }
        let object = object.duplicate().map_err(io::Error::other)?;
        self.written
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(WrittenObject {
                reference,
                object,
                in_object_stream,
            });
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}
