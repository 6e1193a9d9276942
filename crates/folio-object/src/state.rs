//! State bits carried by nodes and indirect references.
//!
//! The flags are independent axes (flushed-ness, modification, release
//! eligibility), so they are stored as a bit set rather than a single enum.

use std::fmt;

bitflags::bitflags! {
    /// Lifecycle flags of a node or of the reference it is bound to.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ObjectState: u16 {
        /// The object has been written out; its content is final.
        const FLUSHED = 1 << 0;
        /// The reference slot may be reused or written as a free entry.
        const FREE = 1 << 1;
        /// The definition has not been read from the source yet.
        const READING = 1 << 2;
        /// Changed since it was read (incremental updates).
        const MODIFIED = 1 << 3;
        /// The reference names an object stream of the source document.
        const ORIGINAL_OBJECT_STREAM = 1 << 4;
        /// Pending output: written when the document is closed.
        const MUST_BE_FLUSHED = 1 << 5;
        /// Becomes indirect once a document allocates a reference for it.
        const MUST_BE_INDIRECT = 1 << 6;
        /// `release` is ignored for this node.
        const FORBID_RELEASE = 1 << 7;
        /// Detached from its reference; further mutation fails.
        const READ_ONLY = 1 << 8;
    }
}

impl ObjectState {
    /// Bits that live on an indirect reference rather than on the node.
    pub const REFERENCE_BITS: Self = Self::FLUSHED
        .union(Self::FREE)
        .union(Self::READING)
        .union(Self::MODIFIED)
        .union(Self::ORIGINAL_OBJECT_STREAM)
        .union(Self::MUST_BE_FLUSHED);

    /// Returns `true` if FLUSHED is set.
    pub fn is_flushed(&self) -> bool {
        self.contains(Self::FLUSHED)
    }

    pub fn is_free(&self) -> bool {
        self.contains(Self::FREE)
    }

    pub fn is_modified(&self) -> bool {
        self.contains(Self::MODIFIED)
    }

    /// Returns `true` if READ_ONLY is set.
    pub fn is_read_only(&self) -> bool {
        self.contains(Self::READ_ONLY)
    }
}

impl fmt::Debug for ObjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "ObjectState(empty)");
        }
        write!(f, "ObjectState(")?;
        bitflags::parser::to_writer(self, &mut *f)?;
        write!(f, ")")
    }
}
