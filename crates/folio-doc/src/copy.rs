//! Duplication of objects across documents (copy) and within one (clone).
//!
//! A copy walks the source graph from one node. Reference nodes are
//! followed into the source registry; every indirect object reached is given
//! a target reference *before* its content is copied, so cycles end at the
//! already-reserved counterpart. Counterparts are remembered for the whole
//! walk and, in the target writer, across walks.

use std::collections::HashMap;
use std::ops::Deref;

use folio_object::{IndirectReference, ObjectState, PdfName, PdfObject};
use tracing::{debug, warn};

use crate::document::PdfDocument;
use crate::error::{DocError, DocResult};

impl PdfDocument {
    /// Copy `object` of this document into `target`.
    ///
    /// An indirect object (or a reference node) yields a reference node into
    /// `target`; a direct node yields a direct copy. With
    /// `allow_duplicating` off, objects copied into `target` earlier are
    /// reused instead of copied again.
    ///
    /// On failure, nothing allocated by this call remains in `target`.
    pub fn copy_object_to(
        &self,
        object: &PdfObject,
        target: &mut PdfDocument,
        allow_duplicating: bool,
    ) -> DocResult<PdfObject> {
        let reference = object.indirect_reference().or(object.as_reference());
        if let Some(reference) = reference {
            if !reference.belongs_to(self.id()) {
                return Err(DocError::ForeignReference(reference));
            }
        }
        if (reference.is_some() && self.has_writer())
            || object.check_state(ObjectState::MUST_BE_INDIRECT)
        {
            return Err(DocError::NoCopyFromWriteTarget { reference });
        }
        if !self.has_full_read_permission() {
            return Err(DocError::Permission);
        }
        if !target.has_writer() {
            return Err(DocError::NoWriterOnTarget);
        }

        let mark = target.registry.mark();
        let mut session = CopySession::new(self, target, allow_duplicating);
        match session.copy_node(object) {
            Ok(copy) => {
                debug!(
                    source = %self.id().short(),
                    target = %session.target.id().short(),
                    copied = session.copied.len(),
                    "copied object"
                );
                Ok(copy)
            }
            Err(err) => {
                session.rollback();
                target.registry.rollback(mark);
                Err(err)
            }
        }
    }

    /// Copy the indirect object `reference` into `target`.
    pub fn copy_reference_to(
        &self,
        reference: IndirectReference,
        target: &mut PdfDocument,
        allow_duplicating: bool,
    ) -> DocResult<PdfObject> {
        self.copy_object_to(&PdfObject::reference(reference), target, allow_duplicating)
    }

    /// Duplicate `object` within this document.
    ///
    /// A reference node is followed to its referent first. Without
    /// `allow_duplicating`, an indirect referent is shared: the result is a
    /// reference node to it. Otherwise the content is deep-copied, with
    /// reference children shared. A reference this document cannot resolve
    /// is returned as is.
    ///
    /// A direct node flagged MUST_BE_INDIRECT has no reference to share yet
    /// and cannot be owned by two parents, so it is always duplicated; the
    /// copy keeps the flag.
    pub fn clone_object(&self, object: &PdfObject, allow_duplicating: bool) -> DocResult<PdfObject> {
        if let Some(reference) = object.as_reference() {
            let known = reference.belongs_to(self.id()) && self.registry.slot(reference).is_ok();
            if !known || !allow_duplicating {
                return Ok(PdfObject::reference(reference));
            }
            let content = self.source_content(reference)?;
            return Ok((*content).duplicate()?);
        }
        match object.indirect_reference() {
            Some(reference) if !allow_duplicating => Ok(PdfObject::reference(reference)),
            _ => Ok(object.duplicate()?),
        }
    }

    /// Content of `reference` for copying: borrowed when live, re-read when
    /// released, null when free.
    pub(crate) fn source_content(&self, reference: IndirectReference) -> DocResult<SourceContent<'_>> {
        let slot = self.registry.slot(reference)?;
        if slot.state().is_flushed() {
            return Err(DocError::CannotCopyFlushedObject { reference });
        }
        if slot.state().is_free() {
            return Ok(SourceContent::Read(PdfObject::null()));
        }
        if let Some(content) = slot.refers_to.as_ref() {
            return Ok(SourceContent::Live(content));
        }
        let content = self.read_content(reference)?.unwrap_or_else(PdfObject::null);
        Ok(SourceContent::Read(content))
    }
}

/// Content of a source object: the live node, or a fresh read of it.
pub(crate) enum SourceContent<'a> {
    Live(&'a PdfObject),
    Read(PdfObject),
}

impl Deref for SourceContent<'_> {
    type Target = PdfObject;

    fn deref(&self) -> &PdfObject {
        match self {
            Self::Live(object) => object,
            Self::Read(object) => object,
        }
    }
}

/// One copy walk from a source document into a target document.
struct CopySession<'s, 't> {
    source: &'s PdfDocument,
    target: &'t mut PdfDocument,
    allow_duplicating: bool,
    /// Counterparts created by this walk.
    copied: HashMap<IndirectReference, IndirectReference>,
    /// Writer table entries replaced by this walk, for rollback.
    journal: Vec<(IndirectReference, Option<IndirectReference>)>,
}

impl<'s, 't> CopySession<'s, 't> {
    fn new(source: &'s PdfDocument, target: &'t mut PdfDocument, allow_duplicating: bool) -> Self {
        Self {
            source,
            target,
            allow_duplicating,
            copied: HashMap::new(),
            journal: Vec::new(),
        }
    }

    fn copy_node(&mut self, node: &PdfObject) -> DocResult<PdfObject> {
        if let Some(reference) = node.as_reference() {
            return self.copy_reference(reference);
        }
        if let Some(reference) = node.indirect_reference() {
            if let Some(existing) = self.counterpart(reference) {
                return Ok(PdfObject::reference(existing));
            }
            if self.source.is_flushed(reference) {
                return Err(DocError::CannotCopyFlushedObject { reference });
            }
            return self.copy_indirect(reference, node);
        }
        if self.is_catalog(node) {
            warn!("copying a catalog dictionary is forbidden, using null");
            return Ok(PdfObject::null());
        }
        let mut copy = node.new_instance();
        copy.copy_content(node, |child| self.copy_node(child))?;
        Ok(copy)
    }

    fn copy_reference(&mut self, reference: IndirectReference) -> DocResult<PdfObject> {
        if let Some(existing) = self.counterpart(reference) {
            return Ok(PdfObject::reference(existing));
        }
        if self.source.has_writer() {
            return Err(DocError::NoCopyFromWriteTarget {
                reference: Some(reference),
            });
        }
        let source = self.source;
        let content = source.source_content(reference)?;
        self.copy_indirect(reference, &*content)
    }

    fn copy_indirect(&mut self, reference: IndirectReference, content: &PdfObject) -> DocResult<PdfObject> {
        if self.is_catalog(content) {
            warn!(%reference, "copying a catalog dictionary is forbidden, using null");
            return Ok(PdfObject::null());
        }

        let counterpart = self.target.registry.allocate();
        self.remember(reference, counterpart)?;
        let mut copy = content.new_instance();
        copy.copy_content(content, |child| self.copy_node(child))?;
        self.target.registry.bind(counterpart, copy)?;
        Ok(PdfObject::reference(counterpart))
    }

    fn is_catalog(&self, node: &PdfObject) -> bool {
        node.as_dictionary()
            .is_some_and(|dict| dict.is_of_type(&PdfName::CATALOG, self.source))
    }

    /// Target reference already standing for `source`, if any.
    fn counterpart(&self, source: IndirectReference) -> Option<IndirectReference> {
        if let Some(existing) = self.copied.get(&source) {
            return Some(*existing);
        }
        if self.allow_duplicating {
            return None;
        }
        let existing = self.target.writer()?.copied(source)?;
        debug!(%source, target = %existing, "reusing copied object");
        Some(existing)
    }

    fn remember(&mut self, source: IndirectReference, counterpart: IndirectReference) -> DocResult<()> {
        let writer = self.target.writer.as_mut().ok_or(DocError::NoWriterOnTarget)?;
        let previous = writer.record_copy(source, counterpart);
        self.journal.push((source, previous));
        self.copied.insert(source, counterpart);
        Ok(())
    }

    fn rollback(&mut self) {
        if let Some(writer) = self.target.writer.as_mut() {
            for (source, previous) in self.journal.drain(..).rev() {
                writer.restore_copy(source, previous);
            }
        }
        self.copied.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::memory::{InMemorySink, InMemorySource};
    use crate::test_log::capture_warnings;
    use folio_object::{DocumentId, PdfArray, PdfDictionary, Resolver};

    fn placeholder(number: u32) -> PdfObject {
        PdfObject::reference(IndirectReference::new(DocumentId::generate(), number, 0))
    }

    /// Objects 1 and 2 are arrays that both hold object 3, a font dictionary.
    fn shared_source() -> InMemorySource {
        let mut font = PdfDictionary::new();
        font.put(PdfName::TYPE, PdfObject::name("Font"));
        font.put(PdfName::new("BaseFont"), PdfObject::name("Helvetica"));
        InMemorySource::new()
            .with_object(1, PdfArray::from_iter([placeholder(3)]).into())
            .with_object(2, PdfArray::from_iter([placeholder(3)]).into())
            .with_object(3, font.into())
    }

    fn reading(source: InMemorySource) -> PdfDocument {
        PdfDocument::open_reading(source, DocumentConfig::default()).unwrap()
    }

    fn writing() -> PdfDocument {
        PdfDocument::open_writing(InMemorySink::new(), DocumentConfig::default())
    }

    fn at(doc: &PdfDocument, number: u32) -> IndirectReference {
        IndirectReference::new(doc.id(), number, 0)
    }

    /// First element of the array `copy` points at in `target`.
    fn first_element(target: &PdfDocument, copy: &PdfObject) -> IndirectReference {
        let array = copy.resolve(target).unwrap().as_array().unwrap();
        array.get_raw(0).unwrap().as_reference().unwrap()
    }

    // -----------------------------------------------------------------------
    // Copy mode
    // -----------------------------------------------------------------------

    #[test]
    fn shared_object_is_copied_once() {
        let source = reading(shared_source());
        let mut target = writing();

        let first = source.copy_reference_to(at(&source, 1), &mut target, false).unwrap();
        let second = source.copy_reference_to(at(&source, 2), &mut target, false).unwrap();

        assert_eq!(target.len(), 3);
        assert_ne!(first.as_reference(), second.as_reference());
        let font = first_element(&target, &first);
        assert_eq!(font, first_element(&target, &second));
        assert!(font.belongs_to(target.id()));
        let copied = target.object(font).unwrap().unwrap();
        assert!(copied.as_dictionary().unwrap().contains_key(&PdfName::new("BaseFont")));
    }

    #[test]
    fn duplicating_copies_shared_object_again() {
        let source = reading(shared_source());
        let mut target = writing();

        let first = source.copy_reference_to(at(&source, 1), &mut target, true).unwrap();
        let second = source.copy_reference_to(at(&source, 2), &mut target, true).unwrap();

        assert_eq!(target.len(), 4);
        assert_ne!(first_element(&target, &first), first_element(&target, &second));
    }

    #[test]
    fn one_walk_copies_each_object_once() {
        let source = InMemorySource::new()
            .with_object(1, PdfArray::from_iter([placeholder(2), placeholder(2)]).into())
            .with_object(2, PdfObject::integer(5));
        let source = reading(source);
        let mut target = writing();

        let copy = source.copy_reference_to(at(&source, 1), &mut target, true).unwrap();
        assert_eq!(target.len(), 2);
        let array = copy.resolve(&target).unwrap().as_array().unwrap();
        assert_eq!(array.get_raw(0), array.get_raw(1));
    }

    #[test]
    fn cycles_terminate() {
        let mut page = PdfDictionary::new();
        page.put(PdfName::new("Parent"), placeholder(2));
        let mut pages = PdfDictionary::new();
        pages.put(PdfName::KIDS, PdfArray::from_iter([placeholder(1)]).into());
        let source = reading(
            InMemorySource::new()
                .with_object(1, page.into())
                .with_object(2, pages.into()),
        );
        let mut target = writing();

        let copy = source.copy_reference_to(at(&source, 1), &mut target, false).unwrap();
        assert_eq!(target.len(), 2);
        let page_ref = copy.as_reference().unwrap();
        let page = target.object(page_ref).unwrap().unwrap().as_dictionary().unwrap();
        let pages = page.get_as_dictionary(&PdfName::new("Parent"), &target).unwrap();
        let kids = pages.get_as_array(&PdfName::KIDS, &target).unwrap();
        assert_eq!(kids.get_raw(0).unwrap().as_reference(), Some(page_ref));
    }

    #[test]
    fn direct_node_copy_stays_direct() {
        let source = reading(shared_source());
        let mut target = writing();
        let direct = PdfObject::from(PdfArray::from_iter([
            PdfObject::integer(1),
            PdfObject::reference(at(&source, 3)),
        ]));

        let copy = source.copy_object_to(&direct, &mut target, false).unwrap();
        let array = copy.as_array().unwrap();
        assert!(copy.indirect_reference().is_none());
        assert_eq!(array.get_raw(0), Some(&PdfObject::integer(1)));
        let font = array.get_raw(1).unwrap().as_reference().unwrap();
        assert!(font.belongs_to(target.id()));
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn copies_share_no_state_with_source() {
        let source = reading(shared_source());
        let mut target = writing();
        let copy = source.copy_reference_to(at(&source, 3), &mut target, false).unwrap();
        let reference = copy.as_reference().unwrap();

        target
            .object_mut(reference)
            .unwrap()
            .unwrap()
            .as_dictionary_mut()
            .unwrap()
            .unwrap()
            .clear();
        let original = source.object(at(&source, 3)).unwrap().unwrap();
        assert_eq!(original.as_dictionary().unwrap().len(), 2);
    }

    #[test]
    fn released_objects_are_reread_for_copying() {
        let backing = shared_source();
        let mut source = reading(backing.clone());
        let font = at(&source, 3);
        source.release(font).unwrap();
        let reads = backing.reads();

        let mut target = writing();
        let copy = source.copy_reference_to(font, &mut target, false).unwrap();
        assert_eq!(backing.reads(), reads + 1);
        assert!(source.object(font).unwrap().is_none());
        assert!(copy.resolve(&target).unwrap().is_dictionary());
    }

    #[test]
    fn catalog_is_copied_as_null() {
        let mut catalog = PdfDictionary::new();
        catalog.put(PdfName::TYPE, PdfName::CATALOG.into());
        let source = reading(InMemorySource::new().with_object(1, catalog.into()));
        let mut target = writing();

        let (copy, logs) =
            capture_warnings(|| source.copy_reference_to(at(&source, 1), &mut target, false).unwrap());
        assert!(copy.is_null());
        assert!(target.is_empty());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("copying a catalog dictionary is forbidden"));
    }

    #[test]
    fn direct_catalog_is_copied_as_null() {
        let source = reading(shared_source());
        let mut target = writing();
        let mut catalog = PdfDictionary::new();
        catalog.put(PdfName::TYPE, PdfName::CATALOG.into());
        catalog.put(PdfName::PAGES, PdfObject::reference(at(&source, 3)));
        let catalog = PdfObject::from(catalog);

        let (copy, logs) = capture_warnings(|| source.copy_object_to(&catalog, &mut target, false).unwrap());
        assert!(copy.is_null());
        assert!(target.is_empty());
        assert!(logs.contains("copying a catalog dictionary is forbidden"));

        let mut holder = PdfDictionary::new();
        holder.put(PdfName::new("Root"), catalog);
        let copy = source.copy_object_to(&holder.into(), &mut target, false).unwrap();
        let root = copy.as_dictionary().unwrap().get_raw(&PdfName::new("Root")).unwrap();
        assert!(root.is_null());
    }

    #[test]
    fn live_objects_are_borrowed_and_released_ones_reread() {
        let mut source = reading(shared_source());
        let font = at(&source, 3);
        assert!(matches!(source.source_content(font).unwrap(), SourceContent::Live(_)));

        source.release(font).unwrap();
        let content = source.source_content(font).unwrap();
        assert!(matches!(content, SourceContent::Read(_)));
        assert!(content.is_dictionary());
        assert!(content.indirect_reference().is_none());
    }

    #[test]
    fn clone_of_released_object_rereads_it() {
        let mut doc = reading(shared_source());
        let font = at(&doc, 3);
        doc.release(font).unwrap();
        let clone = doc.clone_object(&PdfObject::reference(font), true).unwrap();
        assert_eq!(clone.as_dictionary().unwrap().len(), 2);
    }

    #[test]
    fn failed_copy_leaves_target_untouched() {
        let mut source = reading(shared_source());
        let foreign = IndirectReference::new(DocumentId::generate(), 9, 0);
        source
            .object_mut(at(&source, 1))
            .unwrap()
            .unwrap()
            .as_array_mut()
            .unwrap()
            .unwrap()
            .add(PdfObject::reference(foreign));
        let mut target = writing();

        let err = source
            .copy_reference_to(at(&source, 1), &mut target, false)
            .unwrap_err();
        assert!(matches!(err, DocError::ForeignReference(r) if r == foreign));
        assert!(target.is_empty());
        assert_eq!(target.writer().unwrap().copied_len(), 0);

        // The font was reached before the failure; a later copy must not
        // reuse its discarded counterpart.
        let copy = source.copy_reference_to(at(&source, 3), &mut target, false).unwrap();
        assert!(copy.resolve(&target).is_some());
    }

    // -----------------------------------------------------------------------
    // Copy preconditions
    // -----------------------------------------------------------------------

    #[test]
    fn target_must_have_a_writer() {
        let source = reading(shared_source());
        let mut target = reading(InMemorySource::new());
        let err = source
            .copy_reference_to(at(&source, 1), &mut target, false)
            .unwrap_err();
        assert!(matches!(err, DocError::NoWriterOnTarget));
    }

    #[test]
    fn written_documents_cannot_be_copied_from() {
        let mut source = writing();
        let reference = source.add_object(PdfObject::integer(1)).unwrap();
        let mut target = writing();
        let err = source
            .copy_reference_to(reference, &mut target, false)
            .unwrap_err();
        assert!(matches!(
            err,
            DocError::NoCopyFromWriteTarget { reference: Some(r) } if r == reference
        ));

        let reader = reading(shared_source());
        let mut pending = PdfObject::from(PdfDictionary::new());
        pending.mark_must_be_indirect();
        let err = reader.copy_object_to(&pending, &mut target, false).unwrap_err();
        assert!(matches!(err, DocError::NoCopyFromWriteTarget { reference: None }));
        assert!(target.is_empty());
    }

    #[test]
    fn restricted_sources_cannot_be_copied_from() {
        let restricted = InMemorySource::restricted().with_object(1, PdfObject::integer(1));
        let source = reading(restricted);
        assert!(!source.has_full_read_permission());
        let mut target = writing();
        let err = source
            .copy_reference_to(at(&source, 1), &mut target, false)
            .unwrap_err();
        assert!(matches!(err, DocError::Permission));
    }

    // -----------------------------------------------------------------------
    // Clone mode
    // -----------------------------------------------------------------------

    #[test]
    fn clone_of_direct_array_is_independent() {
        let doc = writing();
        let original = PdfObject::from(PdfArray::from_integers(&[1, 2, 3]));
        let mut clone = doc.clone_object(&original, false).unwrap();
        assert_eq!(clone, original);

        clone.as_array_mut().unwrap().unwrap().set(0, PdfObject::integer(9)).unwrap();
        assert_eq!(original.to_string(), "[1 2 3]");
        assert_eq!(clone.to_string(), "[9 2 3]");
    }

    #[test]
    fn clone_shares_indirect_objects_unless_duplicating() {
        let mut doc = writing();
        let reference = doc.add_object(PdfArray::from_integers(&[4]).into()).unwrap();
        let node = PdfObject::reference(reference);

        let shared = doc.clone_object(&node, false).unwrap();
        assert_eq!(shared.as_reference(), Some(reference));

        let duplicated = doc.clone_object(&node, true).unwrap();
        assert_eq!(duplicated.to_string(), "[4]");
        assert!(duplicated.indirect_reference().is_none());
        assert!(duplicated.check_state(ObjectState::MUST_BE_INDIRECT));

        let bound = doc.resolve(&reference).unwrap();
        assert_eq!(doc.clone_object(bound, false).unwrap().as_reference(), Some(reference));
    }

    #[test]
    fn clone_of_pending_indirect_node_is_a_flagged_copy() {
        let doc = writing();
        let mut pending = PdfObject::from(PdfArray::from_integers(&[1]));
        pending.mark_must_be_indirect();

        let clone = doc.clone_object(&pending, false).unwrap();
        assert_eq!(clone.to_string(), "[1]");
        assert!(clone.indirect_reference().is_none());
        assert!(clone.check_state(ObjectState::MUST_BE_INDIRECT));
    }

    #[test]
    fn clone_of_unknown_reference_returns_it() {
        let doc = writing();
        let unknown = IndirectReference::new(doc.id(), 42, 0);
        let clone = doc.clone_object(&PdfObject::reference(unknown), true).unwrap();
        assert_eq!(clone.as_reference(), Some(unknown));
    }

    #[test]
    fn clone_of_flushed_object_fails() {
        let mut doc = writing();
        let reference = doc.add_object(PdfObject::integer(1)).unwrap();
        doc.flush(reference, false).unwrap();
        let err = doc
            .clone_object(&PdfObject::reference(reference), true)
            .unwrap_err();
        assert!(matches!(err, DocError::CannotCopyFlushedObject { .. }));
    }
}
