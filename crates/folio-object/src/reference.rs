use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one open document.
///
/// References carry the id of the document whose registry owns them, so a
/// handle can never be resolved against the wrong registry by accident.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh, time-ordered document id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex characters, for log lines.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.short())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Document-independent object identity: object number plus generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub number: u32,
    pub generation: u16,
}

impl ObjectKey {
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.generation)
    }
}

/// Handle to a slot in a document's object registry.
///
/// The handle is plain data: the registry owns the live node, and a
/// reference held by a container only names the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndirectReference {
    document: DocumentId,
    object_number: u32,
    generation: u16,
}

impl IndirectReference {
    /// A reference to object `object_number` of `document`.
    pub fn new(document: DocumentId, object_number: u32, generation: u16) -> Self {
        Self {
            document,
            object_number,
            generation,
        }
    }

    /// The document the reference points into.
    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn object_number(&self) -> u32 {
        self.object_number
    }

    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// The document-independent part of the reference.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.object_number, self.generation)
    }

    /// Returns `true` if the reference belongs to `document`.
    pub fn belongs_to(&self, document: DocumentId) -> bool {
        self.document == document
    }
}

impl fmt::Display for IndirectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.object_number, self.generation)
    }
}
