use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use crate::array::PdfArray;
use crate::error::ObjectResult;
use crate::object::PdfObject;
use crate::rectangle::Rectangle;
use crate::resolve::Resolver;
use crate::scalar::{PdfName, PdfNumber, PdfString};
use crate::stream::PdfStream;

/// Mapping from names to nodes.
///
/// Keys are kept sorted so that serialization output is stable.
#[derive(Debug, Default, PartialEq)]
pub struct PdfDictionary {
    entries: BTreeMap<PdfName, PdfObject>,
}

impl PdfDictionary {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &PdfName) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace an entry, returning the previous node.
    pub fn put(&mut self, key: PdfName, value: PdfObject) -> Option<PdfObject> {
        self.entries.insert(key, value)
    }

    /// Move every entry of `other` into this dictionary, replacing clashes.
    pub fn put_all(&mut self, other: PdfDictionary) {
        self.entries.extend(other.entries);
    }

    /// Remove and return the value under `key`.
    pub fn remove(&mut self, key: &PdfName) -> Option<PdfObject> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> btree_map::Keys<'_, PdfName, PdfObject> {
        self.entries.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, PdfName, PdfObject> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> btree_map::ValuesMut<'_, PdfName, PdfObject> {
        self.entries.values_mut()
    }

    /// Entries in key order, references unresolved.
    pub fn iter(&self) -> btree_map::Iter<'_, PdfName, PdfObject> {
        self.entries.iter()
    }

    /// The stored node, without following references.
    pub fn get_raw(&self, key: &PdfName) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    pub fn get_raw_mut(&mut self, key: &PdfName) -> Option<&mut PdfObject> {
        self.entries.get_mut(key)
    }

    /// The node under `key`, following a reference node to its referent.
    pub fn get<'a, R: Resolver + ?Sized>(&'a self, key: &PdfName, resolver: &'a R) -> Option<&'a PdfObject> {
        self.entries.get(key)?.resolve(resolver)
    }

    pub fn get_as_array<'a, R: Resolver + ?Sized>(&'a self, key: &PdfName, resolver: &'a R) -> Option<&'a PdfArray> {
        self.get(key, resolver)?.as_array()
    }

    /// Value under `key`, resolved, if it is a dictionary.
    pub fn get_as_dictionary<'a, R: Resolver + ?Sized>(
        &'a self,
        key: &PdfName,
        resolver: &'a R,
    ) -> Option<&'a PdfDictionary> {
        self.get(key, resolver)?.as_dictionary()
    }

    pub fn get_as_stream<'a, R: Resolver + ?Sized>(&'a self, key: &PdfName, resolver: &'a R) -> Option<&'a PdfStream> {
        self.get(key, resolver)?.as_stream()
    }

    pub fn get_as_number<'a, R: Resolver + ?Sized>(&'a self, key: &PdfName, resolver: &'a R) -> Option<&'a PdfNumber> {
        self.get(key, resolver)?.as_number()
    }

    pub fn get_as_name<'a, R: Resolver + ?Sized>(&'a self, key: &PdfName, resolver: &'a R) -> Option<&'a PdfName> {
        self.get(key, resolver)?.as_name()
    }

    pub fn get_as_string<'a, R: Resolver + ?Sized>(&'a self, key: &PdfName, resolver: &'a R) -> Option<&'a PdfString> {
        self.get(key, resolver)?.as_string()
    }

    pub fn get_as_boolean<R: Resolver + ?Sized>(&self, key: &PdfName, resolver: &R) -> Option<bool> {
        self.get(key, resolver)?.as_boolean()
    }

    /// Read the array under `key` as a rectangle. `Ok(None)` when the entry
    /// is absent or not an array.
    pub fn get_as_rectangle<R: Resolver + ?Sized>(&self, key: &PdfName, resolver: &R) -> ObjectResult<Option<Rectangle>> {
        match self.get_as_array(key, resolver) {
            Some(array) => array.to_rectangle(resolver).map(Some),
            None => Ok(None),
        }
    }

    /// True if `/Type` is `type_name`.
    pub fn is_of_type<R: Resolver + ?Sized>(&self, type_name: &PdfName, resolver: &R) -> bool {
        self.get_as_name(&PdfName::TYPE, resolver) == Some(type_name)
    }
}

impl FromIterator<(PdfName, PdfObject)> for PdfDictionary {
    fn from_iter<I: IntoIterator<Item = (PdfName, PdfObject)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PdfDictionary {
    type Item = (PdfName, PdfObject);
    type IntoIter = btree_map::IntoIter<PdfName, PdfObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for PdfDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<<")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key} {value}")?;
        }
        f.write_str(">>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectError;
    use crate::resolve::Detached;

    fn page() -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        dict.put(PdfName::TYPE, PdfName::PAGE.into());
        dict.put(
            PdfName::MEDIA_BOX,
            PdfArray::from_integers(&[0, 0, 612, 792]).into(),
        );
        dict
    }

    #[test]
    fn put_replaces_and_returns_previous() {
        let mut dict = PdfDictionary::new();
        assert!(dict.put(PdfName::LENGTH, PdfObject::integer(1)).is_none());
        let previous = dict.put(PdfName::LENGTH, PdfObject::integer(2)).unwrap();
        assert_eq!(previous, PdfObject::integer(1));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn typed_access_and_type_check() {
        let dict = page();
        assert!(dict.is_of_type(&PdfName::PAGE, &Detached));
        assert!(!dict.is_of_type(&PdfName::CATALOG, &Detached));
        assert!(dict.get_as_array(&PdfName::MEDIA_BOX, &Detached).is_some());
        assert!(dict.get_as_number(&PdfName::MEDIA_BOX, &Detached).is_none());
        assert!(dict.get_as_name(&PdfName::SUBTYPE, &Detached).is_none());
    }

    #[test]
    fn media_box_as_rectangle() {
        let dict = page();
        let rect = dict.get_as_rectangle(&PdfName::MEDIA_BOX, &Detached).unwrap().unwrap();
        assert_eq!(rect.width(), 612.0);
        assert_eq!(rect.height(), 792.0);
        assert_eq!(dict.get_as_rectangle(&PdfName::KIDS, &Detached).unwrap(), None);
    }

    #[test]
    fn malformed_rectangle_entry_is_an_error() {
        let mut dict = PdfDictionary::new();
        dict.put(PdfName::MEDIA_BOX, PdfArray::from_integers(&[0, 0]).into());
        let err = dict.get_as_rectangle(&PdfName::MEDIA_BOX, &Detached).unwrap_err();
        assert!(matches!(err, ObjectError::MalformedRectangle { .. }));
    }

    #[test]
    fn keys_are_sorted_for_rendering() {
        let dict: PdfDictionary = [
            (PdfName::new("Z"), PdfObject::integer(1)),
            (PdfName::new("A"), PdfObject::integer(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(dict.to_string(), "<</A 2 /Z 1>>");
    }

    #[test]
    fn put_all_and_remove() {
        let mut dict = page();
        let mut extra = PdfDictionary::new();
        extra.put(PdfName::RESOURCES, PdfDictionary::new().into());
        dict.put_all(extra);
        assert!(dict.contains_key(&PdfName::RESOURCES));
        assert!(dict.remove(&PdfName::TYPE).is_some());
        assert!(!dict.contains_key(&PdfName::TYPE));
    }
}
