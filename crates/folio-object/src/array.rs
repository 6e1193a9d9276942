//! Ordered container of nodes.

use std::fmt;
use std::ops::Range;

use crate::dictionary::PdfDictionary;
use crate::error::{ObjectError, ObjectResult};
use crate::object::PdfObject;
use crate::rectangle::Rectangle;
use crate::resolve::Resolver;
use crate::scalar::{PdfName, PdfNumber, PdfString};
use crate::stream::PdfStream;

/// An ordered sequence of nodes. Duplicates and nulls are allowed.
///
/// Accessors come in two flavours: [`get_raw`](Self::get_raw) returns the
/// stored node as-is (a reference node stays a reference), while
/// [`get`](Self::get) and the typed `get_as_*` accessors follow references
/// through a [`Resolver`]. Typed accessors return `None` on a kind mismatch.
#[derive(Debug, Default, PartialEq)]
pub struct PdfArray {
    items: Vec<PdfObject>,
}

impl PdfArray {
    /// An empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty array with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// An array of real numbers.
    pub fn from_numbers(numbers: &[f64]) -> Self {
        numbers.iter().copied().map(PdfObject::number).collect()
    }

    /// An array of integers.
    pub fn from_integers(numbers: &[i64]) -> Self {
        numbers.iter().copied().map(PdfObject::integer).collect()
    }

    /// An array of boolean nodes.
    pub fn from_booleans(values: &[bool]) -> Self {
        values.iter().copied().map(PdfObject::boolean).collect()
    }

    /// An array of strings, or of names when `as_names` is set.
    pub fn from_strings<S: AsRef<str>>(values: &[S], as_names: bool) -> Self {
        values
            .iter()
            .map(|s| {
                if as_names {
                    PdfObject::name(s.as_ref())
                } else {
                    PdfObject::string(s.as_ref())
                }
            })
            .collect()
    }

    /// `[left bottom right top]` for a rectangle.
    pub fn from_rectangle(rect: &Rectangle) -> Self {
        Self::from_numbers(&[rect.left(), rect.bottom(), rect.right(), rect.top()])
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the array has no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Membership by content equality.
    pub fn contains(&self, object: &PdfObject) -> bool {
        self.items.contains(object)
    }

    /// Position of the first entry equal to `object`.
    pub fn index_of(&self, object: &PdfObject) -> Option<usize> {
        self.items.iter().position(|item| item == object)
    }

    /// Stored entries, references unresolved.
    pub fn iter(&self) -> std::slice::Iter<'_, PdfObject> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, PdfObject> {
        self.items.iter_mut()
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Append `object`.
    pub fn add(&mut self, object: PdfObject) {
        self.items.push(object);
    }

    /// Insert `object` before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, object: PdfObject) -> ObjectResult<()> {
        if index > self.items.len() {
            return Err(self.out_of_bounds(index));
        }
        self.items.insert(index, object);
        Ok(())
    }

    /// Replace the node at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, object: PdfObject) -> ObjectResult<PdfObject> {
        match self.items.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, object)),
            None => Err(self.out_of_bounds(index)),
        }
    }

    /// Remove the first node equal to `object`. Returns `true` if found.
    pub fn remove(&mut self, object: &PdfObject) -> bool {
        match self.index_of(object) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove and return the entry at `index`.
    pub fn remove_at(&mut self, index: usize) -> ObjectResult<PdfObject> {
        if index >= self.items.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.items.remove(index))
    }

    /// Move every node of `other` to the end of this array.
    pub fn append_all(&mut self, other: PdfArray) {
        self.items.extend(other.items);
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn out_of_bounds(&self, index: usize) -> ObjectError {
        ObjectError::IndexOutOfBounds {
            index,
            len: self.items.len(),
        }
    }

    // ---------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------

    /// The stored node, without following references.
    pub fn get_raw(&self, index: usize) -> Option<&PdfObject> {
        self.items.get(index)
    }

    pub fn get_raw_mut(&mut self, index: usize) -> Option<&mut PdfObject> {
        self.items.get_mut(index)
    }

    /// The node at `index`, following a reference node to its referent.
    pub fn get<'a, R: Resolver + ?Sized>(&'a self, index: usize, resolver: &'a R) -> Option<&'a PdfObject> {
        self.items.get(index)?.resolve(resolver)
    }

    /// A view of `range`, or `None` when it is out of bounds.
    pub fn sub_list(&self, range: Range<usize>) -> Option<&[PdfObject]> {
        self.items.get(range)
    }

    pub fn get_as_array<'a, R: Resolver + ?Sized>(&'a self, index: usize, resolver: &'a R) -> Option<&'a PdfArray> {
        self.get(index, resolver)?.as_array()
    }

    /// Entry at `index`, resolved, if it is a dictionary.
    pub fn get_as_dictionary<'a, R: Resolver + ?Sized>(
        &'a self,
        index: usize,
        resolver: &'a R,
    ) -> Option<&'a PdfDictionary> {
        self.get(index, resolver)?.as_dictionary()
    }

    pub fn get_as_stream<'a, R: Resolver + ?Sized>(&'a self, index: usize, resolver: &'a R) -> Option<&'a PdfStream> {
        self.get(index, resolver)?.as_stream()
    }

    pub fn get_as_number<'a, R: Resolver + ?Sized>(&'a self, index: usize, resolver: &'a R) -> Option<&'a PdfNumber> {
        self.get(index, resolver)?.as_number()
    }

    pub fn get_as_name<'a, R: Resolver + ?Sized>(&'a self, index: usize, resolver: &'a R) -> Option<&'a PdfName> {
        self.get(index, resolver)?.as_name()
    }

    pub fn get_as_string<'a, R: Resolver + ?Sized>(&'a self, index: usize, resolver: &'a R) -> Option<&'a PdfString> {
        self.get(index, resolver)?.as_string()
    }

    pub fn get_as_boolean<R: Resolver + ?Sized>(&self, index: usize, resolver: &R) -> Option<bool> {
        self.get(index, resolver)?.as_boolean()
    }

    /// Read `[x1 y1 x2 y2]` as a rectangle with origin `(x1, y1)`.
    ///
    /// Width and height are `x2 - x1` and `y2 - y1` and may be negative.
    pub fn to_rectangle<R: Resolver + ?Sized>(&self, resolver: &R) -> ObjectResult<Rectangle> {
        let mut coords = [0.0; 4];
        for (index, coord) in coords.iter_mut().enumerate() {
            *coord = match self.get_as_number(index, resolver) {
                Some(number) => number.value(),
                None => {
                    let reason = match self.get(index, resolver) {
                        Some(found) => format!("element {index} is a {}, not a number", found.kind()),
                        None => format!("element {index} is missing"),
                    };
                    return Err(ObjectError::MalformedRectangle { reason });
                }
            };
        }
        let [x1, y1, x2, y2] = coords;
        Ok(Rectangle::new(x1, y1, x2 - x1, y2 - y1))
    }
}

impl FromIterator<PdfObject> for PdfArray {
    fn from_iter<I: IntoIterator<Item = PdfObject>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<PdfObject> for PdfArray {
    fn extend<I: IntoIterator<Item = PdfObject>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl From<Vec<PdfObject>> for PdfArray {
    fn from(items: Vec<PdfObject>) -> Self {
        Self { items }
    }
}

impl IntoIterator for PdfArray {
    type Item = PdfObject;
    type IntoIter = std::vec::IntoIter<PdfObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a PdfArray {
    type Item = &'a PdfObject;
    type IntoIter = std::slice::Iter<'a, PdfObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for PdfArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use crate::reference::{DocumentId, IndirectReference};
    use crate::resolve::Detached;
    use proptest::prelude::*;

    /// Resolves exactly one reference to a fixed node.
    struct OneObject {
        reference: IndirectReference,
        object: PdfObject,
    }

    impl Resolver for OneObject {
        fn resolve(&self, reference: &IndirectReference) -> Option<&PdfObject> {
            (*reference == self.reference).then_some(&self.object)
        }
    }

    fn one_two_three() -> PdfArray {
        PdfArray::from_integers(&[1, 2, 3])
    }

    // -----------------------------------------------------------------------
    // Collection operations
    // -----------------------------------------------------------------------

    #[test]
    fn add_insert_and_remove() {
        let mut array = one_two_three();
        array.insert(0, PdfObject::integer(0)).unwrap();
        array.add(PdfObject::null());
        assert_eq!(array.len(), 5);
        assert_eq!(array.index_of(&PdfObject::integer(2)), Some(2));

        assert!(array.remove(&PdfObject::integer(2)));
        assert!(!array.remove(&PdfObject::integer(42)));
        let removed = array.remove_at(0).unwrap();
        assert_eq!(removed, PdfObject::integer(0));
        assert_eq!(array.to_string(), "[1 3 null]");
    }

    #[test]
    fn out_of_bounds_positions_are_errors() {
        let mut array = one_two_three();
        assert_eq!(
            array.set(3, PdfObject::null()).unwrap_err(),
            ObjectError::IndexOutOfBounds { index: 3, len: 3 }
        );
        assert!(array.insert(4, PdfObject::null()).is_err());
        assert!(array.remove_at(3).is_err());
        assert!(array.insert(3, PdfObject::null()).is_ok());
    }

    #[test]
    fn set_returns_previous_node() {
        let mut array = one_two_three();
        let previous = array.set(1, PdfObject::name("Two")).unwrap();
        assert_eq!(previous, PdfObject::integer(2));
        assert_eq!(array.get_raw(1).unwrap().as_name(), Some(&PdfName::new("Two")));
    }

    #[test]
    fn duplicates_and_nulls_are_kept() {
        let mut array = PdfArray::new();
        array.add(PdfObject::null());
        array.add(PdfObject::null());
        array.add(PdfObject::integer(7));
        array.add(PdfObject::integer(7));
        assert_eq!(array.len(), 4);
        assert!(array.contains(&PdfObject::null()));
    }

    #[test]
    fn sub_list_and_bulk_append() {
        let mut array = one_two_three();
        assert_eq!(array.sub_list(1..3).unwrap().len(), 2);
        assert!(array.sub_list(2..5).is_none());

        array.append_all(PdfArray::from_integers(&[4, 5]));
        array.extend([PdfObject::integer(6)]);
        assert_eq!(array.len(), 6);
        assert_eq!(array.to_string(), "[1 2 3 4 5 6]");
        array.clear();
        assert!(array.is_empty());
    }

    #[test]
    fn constructors_for_homogeneous_arrays() {
        let names = PdfArray::from_strings(&["A", "B"], true);
        assert!(names.iter().all(PdfObject::is_name));
        let strings = PdfArray::from_strings(&["A"], false);
        assert!(strings.get_raw(0).unwrap().is_string());
        let flags = PdfArray::from_booleans(&[true, false]);
        assert_eq!(flags.get_as_boolean(1, &Detached), Some(false));
    }

    // -----------------------------------------------------------------------
    // Indirection
    // -----------------------------------------------------------------------

    #[test]
    fn get_follows_reference_but_get_raw_does_not() {
        let reference = IndirectReference::new(DocumentId::generate(), 9, 0);
        let resolver = OneObject {
            reference,
            object: PdfObject::from(PdfDictionary::new()),
        };
        let mut array = PdfArray::new();
        array.add(PdfObject::reference(reference));

        let raw = array.get_raw(0).unwrap();
        assert_eq!(raw.kind(), ObjectKind::IndirectReference);
        let direct = array.get(0, &resolver).unwrap();
        assert_eq!(direct.kind(), ObjectKind::Dictionary);
        assert!(array.get_as_dictionary(0, &resolver).is_some());
        assert!(array.get_as_array(0, &resolver).is_none());
    }

    #[test]
    fn typed_accessors_are_soft_casts() {
        let mut array = PdfArray::new();
        array.add(PdfObject::string("x"));
        assert!(array.get_as_number(0, &Detached).is_none());
        assert!(array.get_as_string(0, &Detached).is_some());
        assert!(array.get_as_number(5, &Detached).is_none());
    }

    // -----------------------------------------------------------------------
    // Rectangles
    // -----------------------------------------------------------------------

    #[test]
    fn to_rectangle_uses_corner_coordinates() {
        let array = PdfArray::from_integers(&[10, 20, 110, 70]);
        let rect = array.to_rectangle(&Detached).unwrap();
        assert_eq!(rect.x(), 10.0);
        assert_eq!(rect.y(), 20.0);
        assert_eq!(rect.width(), 100.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn to_rectangle_rejects_non_numbers() {
        let mut array = PdfArray::new();
        array.add(PdfObject::integer(10));
        array.add(PdfObject::string("x"));
        array.add(PdfObject::integer(110));
        array.add(PdfObject::integer(70));
        let err = array.to_rectangle(&Detached).unwrap_err();
        assert!(matches!(err, ObjectError::MalformedRectangle { .. }));
    }

    #[test]
    fn to_rectangle_rejects_short_arrays() {
        let array = PdfArray::from_integers(&[0, 0, 10]);
        let err = array.to_rectangle(&Detached).unwrap_err();
        assert_eq!(
            err,
            ObjectError::MalformedRectangle {
                reason: "element 3 is missing".into()
            }
        );
    }

    #[test]
    fn to_rectangle_resolves_referenced_numbers() {
        let reference = IndirectReference::new(DocumentId::generate(), 2, 0);
        let resolver = OneObject {
            reference,
            object: PdfObject::integer(40),
        };
        let mut array = PdfArray::from_integers(&[0, 0]);
        array.add(PdfObject::reference(reference));
        array.add(PdfObject::integer(30));
        let rect = array.to_rectangle(&resolver).unwrap();
        assert_eq!(rect.width(), 40.0);
    }

    proptest! {
        #[test]
        fn rectangle_allows_inverted_corners(
            x1 in -1000i32..1000,
            y1 in -1000i32..1000,
            x2 in -1000i32..1000,
            y2 in -1000i32..1000,
        ) {
            let array = PdfArray::from_integers(&[x1.into(), y1.into(), x2.into(), y2.into()]);
            let rect = array.to_rectangle(&Detached).unwrap();
            prop_assert_eq!(rect.width(), f64::from(x2 - x1));
            prop_assert_eq!(rect.height(), f64::from(y2 - y1));
            prop_assert_eq!(PdfArray::from_rectangle(&rect).to_rectangle(&Detached).unwrap(), rect);
        }
    }
}
