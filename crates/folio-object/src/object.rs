//! The graph node and its closed set of kinds.
//!
//! A [`PdfObject`] is a value plus two pieces of lifecycle bookkeeping: the
//! optional [`IndirectReference`] it is bound to, and its [`ObjectState`]
//! bits. Binding is managed by the owning document's registry; a node that
//! lives inside a container is always direct, and containers share indirect
//! objects by storing a [`PdfValue::Reference`] node instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::array::PdfArray;
use crate::dictionary::PdfDictionary;
use crate::error::{ObjectError, ObjectResult};
use crate::reference::IndirectReference;
use crate::resolve::Resolver;
use crate::scalar::{PdfLiteral, PdfName, PdfNumber, PdfString};
use crate::state::ObjectState;
use crate::stream::PdfStream;

/// Kind tag of a node. Fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Array,
    Boolean,
    Dictionary,
    Literal,
    IndirectReference,
    Name,
    Null,
    Number,
    Stream,
    String,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Dictionary => "dictionary",
            Self::Literal => "literal",
            Self::IndirectReference => "indirect reference",
            Self::Name => "name",
            Self::Null => "null",
            Self::Number => "number",
            Self::Stream => "stream",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// Payload of a node.
#[derive(Debug, PartialEq)]
pub enum PdfValue {
    Null,
    Boolean(bool),
    Number(PdfNumber),
    Name(PdfName),
    String(PdfString),
    Literal(PdfLiteral),
    Array(PdfArray),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    /// Points at an indirect object of some document.
    Reference(IndirectReference),
}

impl PdfValue {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Null => ObjectKind::Null,
            Self::Boolean(_) => ObjectKind::Boolean,
            Self::Number(_) => ObjectKind::Number,
            Self::Name(_) => ObjectKind::Name,
            Self::String(_) => ObjectKind::String,
            Self::Literal(_) => ObjectKind::Literal,
            Self::Array(_) => ObjectKind::Array,
            Self::Dictionary(_) => ObjectKind::Dictionary,
            Self::Stream(_) => ObjectKind::Stream,
            Self::Reference(_) => ObjectKind::IndirectReference,
        }
    }

    /// Owned child nodes, in storage order.
    pub fn children(&self) -> Box<dyn Iterator<Item = &PdfObject> + '_> {
        match self {
            Self::Array(array) => Box::new(array.iter()),
            Self::Dictionary(dict) => Box::new(dict.values()),
            Self::Stream(stream) => Box::new(stream.dictionary().values()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Mutable access to owned child nodes.
    pub fn children_mut(&mut self) -> Box<dyn Iterator<Item = &mut PdfObject> + '_> {
        match self {
            Self::Array(array) => Box::new(array.iter_mut()),
            Self::Dictionary(dict) => Box::new(dict.values_mut()),
            Self::Stream(stream) => Box::new(stream.dictionary_mut().values_mut()),
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl fmt::Display for PdfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Literal(l) => write!(f, "{l}"),
            Self::Array(a) => write!(f, "{a}"),
            Self::Dictionary(d) => write!(f, "{d}"),
            Self::Stream(s) => write!(f, "{s}"),
            Self::Reference(r) => write!(f, "{r}"),
        }
    }
}

/// A node in the document graph.
#[derive(Debug)]
pub struct PdfObject {
    value: PdfValue,
    indirect: Option<IndirectReference>,
    state: ObjectState,
}

impl PdfObject {
    /// Create a direct node.
    pub fn new(value: PdfValue) -> Self {
        Self {
            value,
            indirect: None,
            state: ObjectState::empty(),
        }
    }

    /// The null node.
    pub fn null() -> Self {
        Self::new(PdfValue::Null)
    }

    /// A boolean node.
    pub fn boolean(value: bool) -> Self {
        Self::new(PdfValue::Boolean(value))
    }

    /// A real number node.
    pub fn number(value: f64) -> Self {
        Self::new(PdfValue::Number(PdfNumber::new(value)))
    }

    /// An integer number node.
    pub fn integer(value: i64) -> Self {
        Self::new(PdfValue::Number(PdfNumber::integer(value)))
    }

    /// A name node.
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(PdfValue::Name(PdfName::new(value)))
    }

    /// A string node.
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(PdfValue::String(PdfString::new(value)))
    }

    /// A node emitted verbatim.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(PdfValue::Literal(PdfLiteral::new(value)))
    }

    /// A reference node pointing at `reference`.
    pub fn reference(reference: IndirectReference) -> Self {
        Self::new(PdfValue::Reference(reference))
    }

    pub fn kind(&self) -> ObjectKind {
        self.value.kind()
    }

    /// The payload.
    pub fn value(&self) -> &PdfValue {
        &self.value
    }

    /// Mutable payload access. Fails on nodes detached by `release`.
    pub fn value_mut(&mut self) -> ObjectResult<&mut PdfValue> {
        self.ensure_writable()?;
        Ok(&mut self.value)
    }

    /// Take the payload, dropping binding and state.
    pub fn into_value(self) -> PdfValue {
        self.value
    }

    // ---------------------------------------------------------------
    // Kind predicates
    // ---------------------------------------------------------------

    pub fn is_null(&self) -> bool {
        self.kind() == ObjectKind::Null
    }

    pub fn is_boolean(&self) -> bool {
        self.kind() == ObjectKind::Boolean
    }

    pub fn is_number(&self) -> bool {
        self.kind() == ObjectKind::Number
    }

    pub fn is_name(&self) -> bool {
        self.kind() == ObjectKind::Name
    }

    pub fn is_string(&self) -> bool {
        self.kind() == ObjectKind::String
    }

    pub fn is_literal(&self) -> bool {
        self.kind() == ObjectKind::Literal
    }

    pub fn is_array(&self) -> bool {
        self.kind() == ObjectKind::Array
    }

    pub fn is_dictionary(&self) -> bool {
        self.kind() == ObjectKind::Dictionary
    }

    pub fn is_stream(&self) -> bool {
        self.kind() == ObjectKind::Stream
    }

    /// Returns `true` for a reference node.
    pub fn is_indirect_reference(&self) -> bool {
        self.kind() == ObjectKind::IndirectReference
    }

    // ---------------------------------------------------------------
    // Soft casts
    // ---------------------------------------------------------------

    /// The array payload, if this is an array.
    pub fn as_array(&self) -> Option<&PdfArray> {
        match &self.value {
            PdfValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The dictionary payload, if this is a dictionary.
    pub fn as_dictionary(&self) -> Option<&PdfDictionary> {
        match &self.value {
            PdfValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// The stream payload, if this is a stream.
    pub fn as_stream(&self) -> Option<&PdfStream> {
        match &self.value {
            PdfValue::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&PdfNumber> {
        match &self.value {
            PdfValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&PdfName> {
        match &self.value {
            PdfValue::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&PdfString> {
        match &self.value {
            PdfValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self.value {
            PdfValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// The reference this node points at, if it is a reference node.
    pub fn as_reference(&self) -> Option<IndirectReference> {
        match self.value {
            PdfValue::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Mutable array payload. Fails on a released node.
    pub fn as_array_mut(&mut self) -> ObjectResult<Option<&mut PdfArray>> {
        self.ensure_writable()?;
        Ok(match &mut self.value {
            PdfValue::Array(a) => Some(a),
            _ => None,
        })
    }

    pub fn as_dictionary_mut(&mut self) -> ObjectResult<Option<&mut PdfDictionary>> {
        self.ensure_writable()?;
        Ok(match &mut self.value {
            PdfValue::Dictionary(d) => Some(d),
            _ => None,
        })
    }

    pub fn as_stream_mut(&mut self) -> ObjectResult<Option<&mut PdfStream>> {
        self.ensure_writable()?;
        Ok(match &mut self.value {
            PdfValue::Stream(s) => Some(s),
            _ => None,
        })
    }

    /// Follow one hop of indirection. Non-reference nodes resolve to
    /// themselves; references are never nested, so one hop suffices.
    pub fn resolve<'a, R: Resolver + ?Sized>(&'a self, resolver: &'a R) -> Option<&'a PdfObject> {
        match &self.value {
            PdfValue::Reference(r) => resolver.resolve(r),
            _ => Some(self),
        }
    }

    // ---------------------------------------------------------------
    // Indirection and state
    // ---------------------------------------------------------------

    /// The reference this node is bound to, if any.
    pub fn indirect_reference(&self) -> Option<IndirectReference> {
        self.indirect
    }

    /// True if the node is bound to a reference or is flagged to become
    /// indirect once a document allocates one.
    pub fn is_indirect(&self) -> bool {
        self.indirect.is_some() || self.check_state(ObjectState::MUST_BE_INDIRECT)
    }

    /// State bits carried by the node.
    pub fn state(&self) -> ObjectState {
        self.state
    }

    /// Returns `true` if every bit of `state` is set.
    pub fn check_state(&self, state: ObjectState) -> bool {
        self.state.contains(state)
    }

    pub fn set_state(&mut self, state: ObjectState) -> &mut Self {
        self.state.insert(state);
        self
    }

    pub fn clear_state(&mut self, state: ObjectState) -> &mut Self {
        self.state.remove(state);
        self
    }

    /// Flag a direct node to be made indirect when it reaches a document.
    pub fn mark_must_be_indirect(&mut self) -> &mut Self {
        if self.indirect.is_none() {
            self.state.insert(ObjectState::MUST_BE_INDIRECT);
        }
        self
    }

    /// Bind the node to `reference`. Called by the document registry.
    pub fn attach_reference(&mut self, reference: IndirectReference) {
        self.indirect = Some(reference);
        self.state.remove(ObjectState::MUST_BE_INDIRECT | ObjectState::READ_ONLY);
    }

    /// Unbind the node. Called by the document registry.
    pub fn detach_reference(&mut self) -> Option<IndirectReference> {
        self.indirect.take()
    }

    fn ensure_writable(&self) -> ObjectResult<()> {
        if self.state.is_read_only() {
            return Err(ObjectError::UseAfterRelease);
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Copying
    // ---------------------------------------------------------------

    /// A same-kind node with empty content. References have no content of
    /// their own and yield a null node.
    pub fn new_instance(&self) -> PdfObject {
        let value = match &self.value {
            PdfValue::Null | PdfValue::Reference(_) => PdfValue::Null,
            PdfValue::Boolean(_) => PdfValue::Boolean(false),
            PdfValue::Number(_) => PdfValue::Number(PdfNumber::default()),
            PdfValue::Name(_) => PdfValue::Name(PdfName::new("")),
            PdfValue::String(_) => PdfValue::String(PdfString::default()),
            PdfValue::Literal(_) => PdfValue::Literal(PdfLiteral::default()),
            PdfValue::Array(_) => PdfValue::Array(PdfArray::new()),
            PdfValue::Dictionary(_) => PdfValue::Dictionary(PdfDictionary::new()),
            PdfValue::Stream(_) => PdfValue::Stream(PdfStream::default()),
        };
        PdfObject::new(value)
    }

    /// Copy the content of `from` into this node.
    ///
    /// Owned children are passed through `copy_child`, which decides how a
    /// child is reproduced (cloned in place, or copied into another
    /// document). Scalar payloads are copied directly.
    pub fn copy_content<E, F>(&mut self, from: &PdfObject, mut copy_child: F) -> Result<(), E>
    where
        E: From<ObjectError>,
        F: FnMut(&PdfObject) -> Result<PdfObject, E>,
    {
        self.ensure_writable()?;
        let mismatch = ObjectError::KindMismatch {
            expected: self.kind(),
            found: from.kind(),
        };
        match (&mut self.value, &from.value) {
            (PdfValue::Null, PdfValue::Null) => {}
            (PdfValue::Boolean(to), PdfValue::Boolean(src)) => *to = *src,
            (PdfValue::Number(to), PdfValue::Number(src)) => *to = *src,
            (PdfValue::Name(to), PdfValue::Name(src)) => *to = src.clone(),
            (PdfValue::String(to), PdfValue::String(src)) => *to = src.clone(),
            (PdfValue::Literal(to), PdfValue::Literal(src)) => *to = src.clone(),
            (PdfValue::Reference(to), PdfValue::Reference(src)) => *to = *src,
            (PdfValue::Array(to), PdfValue::Array(src)) => {
                for entry in src.iter() {
                    to.add(copy_child(entry)?);
                }
            }
            (PdfValue::Dictionary(to), PdfValue::Dictionary(src)) => {
                for (key, entry) in src.iter() {
                    to.put(key.clone(), copy_child(entry)?);
                }
            }
            (PdfValue::Stream(to), PdfValue::Stream(src)) => {
                for (key, entry) in src.dictionary().iter() {
                    to.dictionary_mut().put(key.clone(), copy_child(entry)?);
                }
                to.set_data(src.data().to_vec());
            }
            _ => return Err(mismatch.into()),
        }
        Ok(())
    }

    /// Clone-mode deep copy of a node that is not looked up in a document.
    ///
    /// Reference nodes are shared rather than copied. Owned children are
    /// duplicated recursively, so a cycle made of direct nodes would not
    /// terminate; cyclic structures must go through indirect objects.
    pub fn duplicate(&self) -> ObjectResult<PdfObject> {
        if let PdfValue::Reference(r) = self.value {
            return Ok(PdfObject::reference(r));
        }
        let mut copy = self.new_instance();
        if self.is_indirect() {
            copy.set_state(ObjectState::MUST_BE_INDIRECT);
        }
        copy.copy_content(self, PdfObject::duplicate)?;
        Ok(copy)
    }
}

impl PartialEq for PdfObject {
    /// Nodes compare by content; binding and state are bookkeeping.
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for PdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<PdfValue> for PdfObject {
    fn from(value: PdfValue) -> Self {
        Self::new(value)
    }
}

impl From<PdfArray> for PdfObject {
    fn from(value: PdfArray) -> Self {
        Self::new(PdfValue::Array(value))
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(value: PdfDictionary) -> Self {
        Self::new(PdfValue::Dictionary(value))
    }
}

impl From<PdfStream> for PdfObject {
    fn from(value: PdfStream) -> Self {
        Self::new(PdfValue::Stream(value))
    }
}

impl From<PdfName> for PdfObject {
    fn from(value: PdfName) -> Self {
        Self::new(PdfValue::Name(value))
    }
}

impl From<PdfNumber> for PdfObject {
    fn from(value: PdfNumber) -> Self {
        Self::new(PdfValue::Number(value))
    }
}

impl From<PdfString> for PdfObject {
    fn from(value: PdfString) -> Self {
        Self::new(PdfValue::String(value))
    }
}

impl From<IndirectReference> for PdfObject {
    fn from(value: IndirectReference) -> Self {
        Self::reference(value)
    }
}

impl From<bool> for PdfObject {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<f64> for PdfObject {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i64> for PdfObject {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}
