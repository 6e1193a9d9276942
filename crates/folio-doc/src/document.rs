//! The document: a registry plus optional reader and writer.
//!
//! Every lifecycle transition of an indirect object goes through here.
//! Checks run before any state is touched; when a collaborator call fails,
//! whatever was prepared for it is rolled back.

use std::fmt;
use std::mem;

use folio_object::{DocumentId, IndirectReference, ObjectKind, ObjectState, PdfObject, Resolver};
use tracing::{debug, info, warn};

use crate::config::DocumentConfig;
use crate::error::{DocError, DocResult};
use crate::reader::PdfReader;
use crate::registry::{Origin, Registry};
use crate::traits::{ObjectSink, ObjectSource};
use crate::writer::PdfWriter;

/// Summary returned by [`PdfDocument::close`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CloseReport {
    /// Objects written during the closing pass.
    pub flushed: usize,
    /// Slots in the registry at close time.
    pub objects: usize,
}

/// A document: the registry of its indirect objects, plus the reader it
/// was opened from and the writer it goes to, when it has them.
pub struct PdfDocument {
    id: DocumentId,
    config: DocumentConfig,
    pub(crate) registry: Registry,
    reader: Option<PdfReader>,
    pub(crate) writer: Option<PdfWriter>,
}

impl PdfDocument {
    // ---------------------------------------------------------------
    // Opening
    // ---------------------------------------------------------------

    /// Open `source` for reading. Objects are loaded up front when
    /// `config.preload_objects` is set, on demand otherwise.
    pub fn open_reading(source: impl ObjectSource + 'static, config: DocumentConfig) -> DocResult<Self> {
        Self::open(Some(PdfReader::new(source)), None, config)
    }

    /// Start an empty document written to `sink`.
    pub fn open_writing(sink: impl ObjectSink + 'static, config: DocumentConfig) -> Self {
        let id = DocumentId::generate();
        info!(document = %id.short(), "opened document for writing");
        Self {
            id,
            config,
            registry: Registry::new(id),
            reader: None,
            writer: Some(PdfWriter::new(sink)),
        }
    }

    /// Open `source` for modification, writing to `sink`.
    pub fn open_stamping(
        source: impl ObjectSource + 'static,
        sink: impl ObjectSink + 'static,
        config: DocumentConfig,
    ) -> DocResult<Self> {
        Self::open(Some(PdfReader::new(source)), Some(PdfWriter::new(sink)), config)
    }

    fn open(reader: Option<PdfReader>, writer: Option<PdfWriter>, config: DocumentConfig) -> DocResult<Self> {
        let id = DocumentId::generate();
        let mut registry = Registry::new(id);
        if let Some(reader) = &reader {
            for key in reader.keys() {
                let reference = registry.seed(key);
                if reader.is_object_stream(key) {
                    registry
                        .slot_mut(reference)?
                        .state
                        .insert(ObjectState::ORIGINAL_OBJECT_STREAM);
                }
            }
        }

        let mut document = Self {
            id,
            config,
            registry,
            reader,
            writer,
        };
        if document.config.preload_objects {
            document.load_all()?;
        }
        info!(
            document = %id.short(),
            objects = document.registry.len(),
            writer = document.writer.is_some(),
            "opened document"
        );
        Ok(document)
    }

    /// Identity stamped on every reference of this document.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Settings the document was opened with.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Whether the document was opened from a source.
    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    /// Whether the document is being written.
    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// Whether the reader grants full access. A document without a reader
    /// owns all of its content.
    pub fn has_full_read_permission(&self) -> bool {
        self.reader
            .as_ref()
            .map_or(true, PdfReader::is_opened_with_full_permission)
    }

    /// The writer, if the document has one.
    pub fn writer(&self) -> Option<&PdfWriter> {
        self.writer.as_ref()
    }

    /// Number of registry slots, free ones included.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if the registry has no slots.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Every reference of the registry, in object-number order.
    pub fn references(&self) -> Vec<IndirectReference> {
        self.registry.references()
    }

    // ---------------------------------------------------------------
    // Indirection
    // ---------------------------------------------------------------

    /// Reserve a fresh reference. Nothing is bound to it yet.
    pub fn allocate_reference(&mut self) -> IndirectReference {
        self.registry.allocate()
    }

    /// Make `object` indirect; see [`make_indirect_with`](Self::make_indirect_with).
    pub fn make_indirect(&mut self, object: &mut PdfObject) -> DocResult<IndirectReference> {
        self.make_indirect_with(object, None)
    }

    /// Move `object` into the registry under `reference` (or a freshly
    /// allocated one) and leave a reference node in its place.
    ///
    /// Calling it again on the result returns the same reference, with or
    /// without a writer.
    pub fn make_indirect_with(
        &mut self,
        object: &mut PdfObject,
        reference: Option<IndirectReference>,
    ) -> DocResult<IndirectReference> {
        if let Some(bound) = object.as_reference().or(object.indirect_reference()) {
            return Ok(bound);
        }
        if self.writer.is_none() {
            return Err(DocError::NoWriter);
        }
        let reference = match reference {
            Some(reference) => {
                if self.registry.slot(reference)?.state.is_flushed() {
                    return Err(DocError::CannotCopyFlushedObject { reference });
                }
                reference
            }
            None => self.registry.allocate(),
        };
        let content = mem::replace(object, PdfObject::reference(reference));
        self.registry.bind(reference, content)?;
        Ok(reference)
    }

    /// Make `object` indirect and return its reference.
    pub fn add_object(&mut self, mut object: PdfObject) -> DocResult<IndirectReference> {
        self.make_indirect(&mut object)
    }

    // ---------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------

    /// The live content of `reference`. `None` if it is free, released, or
    /// not read yet.
    pub fn object(&self, reference: IndirectReference) -> DocResult<Option<&PdfObject>> {
        let slot = self.registry.slot(reference)?;
        if slot.state.is_flushed() {
            return Err(DocError::ObjectFlushed { reference });
        }
        Ok(slot.refers_to.as_ref())
    }

    /// Mutable content of `reference`, read from the source first if needed.
    pub fn object_mut(&mut self, reference: IndirectReference) -> DocResult<Option<&mut PdfObject>> {
        if self.registry.slot(reference)?.state.is_flushed() {
            return Err(DocError::CannotCopyFlushedObject { reference });
        }
        self.load(reference)?;
        Ok(self.registry.slot_mut(reference)?.refers_to.as_mut())
    }

    /// Read the definition of `reference` if it is not in memory.
    pub fn load(&mut self, reference: IndirectReference) -> DocResult<()> {
        let slot = self.registry.slot(reference)?;
        if slot.is_live() || slot.state.intersects(ObjectState::FLUSHED | ObjectState::FREE) {
            return Ok(());
        }
        if slot.origin != Origin::Read {
            return Ok(());
        }
        let content = self.read_content(reference)?;
        let slot = self.registry.slot_mut(reference)?;
        slot.state.remove(ObjectState::READING);
        match content {
            Some(mut content) => {
                content.attach_reference(reference);
                if slot.state.is_modified() {
                    content.set_state(ObjectState::FORBID_RELEASE);
                }
                slot.refers_to = Some(content);
                debug!(%reference, "loaded object");
            }
            None => {
                slot.state.insert(ObjectState::FREE);
                debug!(%reference, "source has no definition, marking free");
            }
        }
        Ok(())
    }

    /// Read every object not yet in memory.
    pub fn load_all(&mut self) -> DocResult<()> {
        for reference in self.registry.references() {
            self.load(reference)?;
        }
        Ok(())
    }

    /// Fresh, unbound copy of a read object's definition.
    pub(crate) fn read_content(&self, reference: IndirectReference) -> DocResult<Option<PdfObject>> {
        let Some(reader) = &self.reader else {
            return Ok(None);
        };
        if self.registry.slot(reference)?.origin != Origin::Read {
            return Ok(None);
        }
        Ok(reader.read(reference.key(), self.id)?)
    }

    /// Fill the bound object `target` with a copy of `from`'s content.
    pub fn copy_content(&mut self, target: IndirectReference, from: &PdfObject) -> DocResult<()> {
        let Some(node) = self.object_mut(target)? else {
            return Err(DocError::UnknownReference(target));
        };
        node.copy_content(from, |child| PdfObject::duplicate(child).map_err(DocError::from))
    }

    // ---------------------------------------------------------------
    // State queries
    // ---------------------------------------------------------------

    /// State bits recorded on `reference`.
    pub fn reference_state(&self, reference: IndirectReference) -> DocResult<ObjectState> {
        Ok(self.registry.slot(reference)?.state)
    }

    /// Returns `true` if `reference` was written. Unknown references are not.
    pub fn is_flushed(&self, reference: IndirectReference) -> bool {
        self.has_state(reference, ObjectState::FLUSHED)
    }

    /// Returns `true` if `reference` was marked modified.
    pub fn is_modified(&self, reference: IndirectReference) -> bool {
        self.has_state(reference, ObjectState::MODIFIED)
    }

    /// Returns `true` if `reference` was freed or has no definition.
    pub fn is_free(&self, reference: IndirectReference) -> bool {
        self.has_state(reference, ObjectState::FREE)
    }

    fn has_state(&self, reference: IndirectReference, state: ObjectState) -> bool {
        self.registry
            .slot(reference)
            .is_ok_and(|slot| slot.state.contains(state))
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Record that `reference` changed since it was read. Its node can no
    /// longer be released.
    pub fn set_modified(&mut self, reference: IndirectReference) -> DocResult<()> {
        let slot = self.registry.slot_mut(reference)?;
        slot.state.insert(ObjectState::MODIFIED);
        if let Some(node) = slot.refers_to.as_mut() {
            node.set_state(ObjectState::FORBID_RELEASE);
        }
        debug!(%reference, "marked modified");
        Ok(())
    }

    /// Write `reference` to the writer. Its content is final afterwards.
    ///
    /// Flushing something already flushed, free, or without content in
    /// memory does nothing.
    pub fn flush(&mut self, reference: IndirectReference, can_be_in_object_stream: bool) -> DocResult<()> {
        let slot = self.registry.slot(reference)?;
        if slot.state.intersects(ObjectState::FLUSHED | ObjectState::FREE) || !slot.is_live() {
            debug!(%reference, state = ?slot.state, "meaningless flush");
            return Ok(());
        }
        let Some(writer) = self.writer.as_mut() else {
            return Err(DocError::NoWriter);
        };

        let slot = self.registry.slot_mut(reference)?;
        let Some(mut content) = slot.refers_to.take() else {
            return Ok(());
        };
        let in_object_stream = can_be_in_object_stream
            && self.config.use_object_streams
            && !matches!(content.kind(), ObjectKind::Stream | ObjectKind::IndirectReference)
            && reference.generation() == 0;

        let mark = self.registry.mark();
        let mut promoted = Vec::new();
        let written = self
            .registry
            .promote_pending(&mut content, &mut promoted)
            .and_then(|()| {
                writer
                    .write(reference, &content, in_object_stream)
                    .map_err(|source| DocError::CannotFlushObject { reference, source })
            });

        if let Err(err) = written {
            self.registry.restore_promoted(&mut content, &promoted);
            self.registry.rollback(mark);
            self.registry.slot_mut(reference)?.refers_to = Some(content);
            return Err(err);
        }

        let slot = self.registry.slot_mut(reference)?;
        slot.state.insert(ObjectState::FLUSHED);
        slot.state.remove(ObjectState::MUST_BE_FLUSHED);
        debug!(
            %reference,
            in_object_stream,
            promoted = promoted.len(),
            "flushed object"
        );
        Ok(())
    }

    /// Drop the in-memory content of a read object so it can be reclaimed.
    ///
    /// Returns the detached node, now read-only. Modified objects and
    /// objects flagged FORBID_RELEASE stay as they are (with a warning), as
    /// do objects created in this session or already flushed, which have
    /// nowhere to be re-read from.
    pub fn release(&mut self, reference: IndirectReference) -> DocResult<Option<PdfObject>> {
        let has_reader = self.reader.is_some();
        let slot = self.registry.slot_mut(reference)?;
        let Some(node) = slot.refers_to.as_ref() else {
            return Ok(None);
        };
        if node.check_state(ObjectState::FORBID_RELEASE) || slot.state.is_modified() {
            warn!(%reference, "forbidden to release object, ignoring");
            return Ok(None);
        }
        if !has_reader || slot.origin != Origin::Read || slot.state.is_flushed() {
            debug!(%reference, "object is not releasable");
            return Ok(None);
        }
        let Some(mut node) = slot.refers_to.take() else {
            return Ok(None);
        };
        node.detach_reference();
        node.set_state(ObjectState::READ_ONLY);
        debug!(%reference, "released object");
        Ok(Some(node))
    }

    /// Bring a released object back from the reader.
    pub fn reacquire(&mut self, reference: IndirectReference) -> DocResult<()> {
        self.load(reference)
    }

    /// Give up `reference`: its content is dropped and the slot marked free.
    pub fn free_reference(&mut self, reference: IndirectReference) -> DocResult<()> {
        let slot = self.registry.slot_mut(reference)?;
        if slot.state.is_flushed() {
            return Err(DocError::CannotCopyFlushedObject { reference });
        }
        slot.refers_to = None;
        slot.state.insert(ObjectState::FREE);
        slot.state.remove(ObjectState::MUST_BE_FLUSHED | ObjectState::MODIFIED);
        debug!(%reference, "freed reference");
        Ok(())
    }

    /// Flush everything still pending and finish the writer.
    ///
    /// Pending means queued for output, or modified since reading. In
    /// append mode only modified objects and objects created in this session
    /// are written. Object streams of the source are never rewritten.
    pub fn close(mut self) -> DocResult<CloseReport> {
        let mut report = CloseReport::default();
        if self.writer.is_some() {
            loop {
                let pending = self.pending();
                if pending.is_empty() {
                    break;
                }
                for reference in pending {
                    self.flush(reference, true)?;
                    report.flushed += 1;
                }
            }
            if let Some(writer) = self.writer.as_mut() {
                writer.finish()?;
            }
        }
        report.objects = self.registry.len();
        info!(
            document = %self.id.short(),
            flushed = report.flushed,
            objects = report.objects,
            "closed document"
        );
        Ok(report)
    }

    fn pending(&self) -> Vec<IndirectReference> {
        let append = self.config.append_mode;
        self.registry
            .references()
            .into_iter()
            .filter(|reference| {
                let Ok(slot) = self.registry.slot(*reference) else {
                    return false;
                };
                let state = slot.state;
                if !slot.is_live()
                    || state.intersects(
                        ObjectState::FLUSHED | ObjectState::FREE | ObjectState::ORIGINAL_OBJECT_STREAM,
                    )
                {
                    return false;
                }
                if append {
                    state.is_modified()
                        || (slot.origin == Origin::Created && state.contains(ObjectState::MUST_BE_FLUSHED))
                } else {
                    state.intersects(ObjectState::MUST_BE_FLUSHED | ObjectState::MODIFIED)
                }
            })
            .collect()
    }
}

impl Resolver for PdfDocument {
    /// Live content only: released, unread, and flushed objects resolve to
    /// nothing.
    fn resolve(&self, reference: &IndirectReference) -> Option<&PdfObject> {
        let slot = self.registry.slot(*reference).ok()?;
        if slot.state.is_flushed() {
            return None;
        }
        slot.refers_to.as_ref()
    }
}

impl fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfDocument")
            .field("id", &self.id)
            .field("objects", &self.registry.len())
            .field("reader", &self.reader.is_some())
            .field("writer", &self.writer.is_some())
            .finish()
    }
}
