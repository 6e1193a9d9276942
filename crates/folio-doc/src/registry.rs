//! The per-document indirect-reference registry.
//!
//! The registry is an arena of slots keyed by object number. Nodes never
//! point at each other; a node bound to a reference only holds the copyable
//! [`IndirectReference`] handle, and the slot owns the live content. Release
//! and flush therefore invalidate the association by editing one slot.
//!
//! # Invariants
//!
//! - Exactly one slot exists per object number, with one generation.
//! - Allocation hands out `max + 1`, generation 0.
//! - Every reference handed out carries this registry's document id.

use std::collections::BTreeMap;

use folio_object::{DocumentId, IndirectReference, ObjectKey, ObjectState, PdfObject};
use tracing::debug;

use crate::error::{DocError, DocResult};

/// Where the slot's definition comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Seeded from the reader; content can be re-read after a release.
    Read,
    /// Allocated while the document was open.
    Created,
}

/// One entry of the registry.
#[derive(Debug)]
pub struct RefSlot {
    pub(crate) generation: u16,
    pub(crate) state: ObjectState,
    pub(crate) origin: Origin,
    pub(crate) refers_to: Option<PdfObject>,
}

impl RefSlot {
    fn new(generation: u16, origin: Origin) -> Self {
        Self {
            generation,
            state: ObjectState::empty(),
            origin,
            refers_to: None,
        }
    }

    /// Generation of the slot's reference.
    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// Reference state bits.
    pub fn state(&self) -> ObjectState {
        self.state
    }

    /// Whether the slot came from the reader or was allocated here.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Whether content is currently held in memory.
    pub fn is_live(&self) -> bool {
        self.refers_to.is_some()
    }
}

/// Position to which a failed operation rolls allocations back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryMark {
    last: u32,
}

#[derive(Debug)]
pub struct Registry {
    document: DocumentId,
    slots: BTreeMap<u32, RefSlot>,
}

impl Registry {
    /// An empty registry for `document`.
    pub fn new(document: DocumentId) -> Self {
        Self {
            document,
            slots: BTreeMap::new(),
        }
    }

    /// The document every slot belongs to.
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Number of slots, free ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn last_number(&self) -> u32 {
        self.slots.keys().next_back().copied().unwrap_or(0)
    }

    // ---------------------------------------------------------------
    // Slot creation
    // ---------------------------------------------------------------

    /// Reserve the next object number at generation 0.
    pub fn allocate(&mut self) -> IndirectReference {
        let number = self.last_number() + 1;
        self.slots.insert(number, RefSlot::new(0, Origin::Created));
        debug!(document = %self.document.short(), number, "allocated reference");
        IndirectReference::new(self.document, number, 0)
    }

    /// Register a slot announced by the reader. The content is read later.
    pub fn seed(&mut self, key: ObjectKey) -> IndirectReference {
        let mut slot = RefSlot::new(key.generation, Origin::Read);
        slot.state.insert(ObjectState::READING);
        self.slots.insert(key.number, slot);
        IndirectReference::new(self.document, key.number, key.generation)
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    fn check(&self, reference: IndirectReference) -> DocResult<()> {
        if !reference.belongs_to(self.document) {
            return Err(DocError::ForeignReference(reference));
        }
        Ok(())
    }

    /// The slot of `reference`.
    pub fn slot(&self, reference: IndirectReference) -> DocResult<&RefSlot> {
        self.check(reference)?;
        self.slots
            .get(&reference.object_number())
            .filter(|slot| slot.generation == reference.generation())
            .ok_or(DocError::UnknownReference(reference))
    }

    /// Mutable slot of `reference`.
    pub fn slot_mut(&mut self, reference: IndirectReference) -> DocResult<&mut RefSlot> {
        self.check(reference)?;
        self.slots
            .get_mut(&reference.object_number())
            .filter(|slot| slot.generation == reference.generation())
            .ok_or(DocError::UnknownReference(reference))
    }

    /// All references, in object-number order.
    pub fn references(&self) -> Vec<IndirectReference> {
        self.slots
            .iter()
            .map(|(number, slot)| IndirectReference::new(self.document, *number, slot.generation))
            .collect()
    }

    // ---------------------------------------------------------------
    // Binding
    // ---------------------------------------------------------------

    /// Store `content` as the definition of `reference` and queue it for
    /// output.
    pub fn bind(&mut self, reference: IndirectReference, mut content: PdfObject) -> DocResult<()> {
        let slot = self.slot_mut(reference)?;
        content.attach_reference(reference);
        slot.refers_to = Some(content);
        slot.state.remove(ObjectState::FREE | ObjectState::READING);
        slot.state.insert(ObjectState::MUST_BE_FLUSHED);
        debug!(%reference, "bound object");
        Ok(())
    }

    /// Make every MUST_BE_INDIRECT descendant of `node` indirect, deepest
    /// first. New references are appended to `promoted`.
    pub fn promote_pending(
        &mut self,
        node: &mut PdfObject,
        promoted: &mut Vec<IndirectReference>,
    ) -> DocResult<()> {
        for child in node.value_mut()?.children_mut() {
            if child.check_state(ObjectState::MUST_BE_INDIRECT) {
                let reference = self.allocate();
                let mut content = std::mem::replace(child, PdfObject::reference(reference));
                self.promote_pending(&mut content, promoted)?;
                self.bind(reference, content)?;
                promoted.push(reference);
            } else {
                self.promote_pending(child, promoted)?;
            }
        }
        Ok(())
    }

    /// Undo [`promote_pending`](Self::promote_pending): put the promoted
    /// content back in place of its reference nodes. The slots themselves
    /// are dropped by a [`rollback`](Self::rollback).
    pub fn restore_promoted(&mut self, node: &mut PdfObject, promoted: &[IndirectReference]) {
        let Ok(value) = node.value_mut() else {
            return;
        };
        for child in value.children_mut() {
            let pending = child.as_reference().filter(|r| promoted.contains(r));
            match pending {
                Some(reference) => {
                    let content = self
                        .slot_mut(reference)
                        .ok()
                        .and_then(|slot| slot.refers_to.take());
                    if let Some(mut content) = content {
                        content.detach_reference();
                        content.mark_must_be_indirect();
                        self.restore_promoted(&mut content, promoted);
                        *child = content;
                    }
                }
                None => self.restore_promoted(child, promoted),
            }
        }
    }

    // ---------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------

    /// Remember the current extent for a later [`rollback`](Self::rollback).
    pub fn mark(&self) -> RegistryMark {
        RegistryMark {
            last: self.last_number(),
        }
    }

    /// Drop every slot allocated after `mark`.
    pub fn rollback(&mut self, mark: RegistryMark) {
        let dropped = self.slots.split_off(&(mark.last + 1));
        if !dropped.is_empty() {
            debug!(
                document = %self.document.short(),
                dropped = dropped.len(),
                "rolled back allocations"
            );
        }
    }
}
