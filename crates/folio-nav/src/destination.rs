use folio_object::{IndirectReference, ObjectWrapper, PdfArray, PdfName, PdfObject, PdfValue};

/// The page a destination points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestinationTarget {
    /// A page object of the same document.
    Page(IndirectReference),
    /// A 1-based page number, for destinations into other documents.
    /// There is no page 0: it is stored as the first page, the same as 1.
    PageNumber(u32),
}

impl DestinationTarget {
    fn to_object(self) -> PdfObject {
        match self {
            Self::Page(reference) => PdfObject::reference(reference),
            // Stored 0-based.
            Self::PageNumber(number) => PdfObject::integer(i64::from(number.saturating_sub(1))),
        }
    }
}

/// An explicit destination: `[page /Kind parameters...]`.
///
/// Destinations are embedded directly in outlines and link actions, so the
/// wrapped array is not required to be indirect.
#[derive(Debug, PartialEq)]
pub struct ExplicitDestination {
    object: PdfObject,
}

impl ExplicitDestination {
    /// Wrap an existing destination array.
    pub fn from_array(array: PdfArray) -> Self {
        Self {
            object: Self::wrap_object(array.into()),
        }
    }

    /// Wrap `object` if it is an array.
    pub fn from_object(object: PdfObject) -> Option<Self> {
        object.is_array().then(|| Self {
            object: Self::wrap_object(object),
        })
    }

    /// Build `[target kind left bottom right top zoom]`, leaving out the
    /// parameters that are `None`.
    pub fn create(
        target: DestinationTarget,
        kind: PdfName,
        left: Option<f64>,
        bottom: Option<f64>,
        right: Option<f64>,
        top: Option<f64>,
        zoom: Option<f64>,
    ) -> Self {
        let mut array = PdfArray::with_capacity(7);
        array.add(target.to_object());
        array.add(kind.into());
        array.extend(
            [left, bottom, right, top, zoom]
                .into_iter()
                .flatten()
                .map(PdfObject::number),
        );
        Self::from_array(array)
    }

    /// Display the page with `(left, top)` at the window corner, magnified
    /// by `zoom`.
    pub fn xyz(target: DestinationTarget, left: f64, top: f64, zoom: f64) -> Self {
        Self::create(target, PdfName::XYZ, Some(left), None, None, Some(top), Some(zoom))
    }

    /// Fit the whole page in the window.
    pub fn fit(target: DestinationTarget) -> Self {
        Self::create(target, PdfName::FIT, None, None, None, None, None)
    }

    /// Fit the page width, `top` at the upper edge.
    pub fn fit_h(target: DestinationTarget, top: f64) -> Self {
        Self::create(target, PdfName::FIT_H, None, None, None, Some(top), None)
    }

    /// Fit the page height, `left` at the left edge.
    pub fn fit_v(target: DestinationTarget, left: f64) -> Self {
        Self::create(target, PdfName::FIT_V, Some(left), None, None, None, None)
    }

    /// Fit the given rectangle in the window.
    pub fn fit_r(target: DestinationTarget, left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self::create(
            target,
            PdfName::FIT_R,
            Some(left),
            Some(bottom),
            Some(right),
            Some(top),
            None,
        )
    }

    /// Fit the page's bounding box.
    pub fn fit_b(target: DestinationTarget) -> Self {
        Self::create(target, PdfName::FIT_B, None, None, None, None, None)
    }

    /// Fit the bounding box width, `top` at the upper edge.
    pub fn fit_bh(target: DestinationTarget, top: f64) -> Self {
        Self::create(target, PdfName::FIT_BH, None, None, None, Some(top), None)
    }

    /// Fit the bounding box height, `left` at the left edge.
    pub fn fit_bv(target: DestinationTarget, left: f64) -> Self {
        Self::create(target, PdfName::FIT_BV, Some(left), None, None, None, None)
    }

    fn array(&self) -> Option<&PdfArray> {
        self.object.as_array()
    }

    /// The first element as stored: a page reference or a 0-based number.
    pub fn destination_page(&self) -> Option<&PdfObject> {
        self.array()?.get_raw(0)
    }

    /// The page this destination points at, with numbers back to 1-based.
    pub fn target(&self) -> Option<DestinationTarget> {
        match self.destination_page()?.value() {
            PdfValue::Reference(reference) => Some(DestinationTarget::Page(*reference)),
            PdfValue::Number(number) => {
                let index = u32::try_from(number.int_value()).ok()?;
                Some(DestinationTarget::PageNumber(index.saturating_add(1)))
            }
            _ => None,
        }
    }

    /// The fit kind, such as `/XYZ` or `/FitR`.
    pub fn kind(&self) -> Option<&PdfName> {
        self.array()?.get_raw(1)?.as_name()
    }

    /// The numeric parameters following the kind.
    pub fn parameters(&self) -> Vec<f64> {
        self.array()
            .map(|array| {
                array
                    .iter()
                    .skip(2)
                    .filter_map(|entry| entry.as_number().map(|n| n.value()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ObjectWrapper for ExplicitDestination {
    fn wrapped_must_be_indirect() -> bool {
        false
    }

    fn object(&self) -> &PdfObject {
        &self.object
    }

    fn into_object(self) -> PdfObject {
        self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_doc::{DocumentConfig, InMemorySink, PdfDocument};
    use folio_object::PdfDictionary;

    // -----------------------------------------------------------------------
    // Factories
    // -----------------------------------------------------------------------

    #[test]
    fn xyz_layout() {
        let dest = ExplicitDestination::xyz(DestinationTarget::PageNumber(3), 10.0, 700.0, 1.5);
        assert_eq!(dest.object().to_string(), "[2 /XYZ 10 700 1.5]");
        assert_eq!(dest.kind(), Some(&PdfName::XYZ));
        assert_eq!(dest.parameters(), vec![10.0, 700.0, 1.5]);
    }

    #[test]
    fn page_numbers_are_stored_zero_based() {
        let dest = ExplicitDestination::fit(DestinationTarget::PageNumber(1));
        assert_eq!(dest.destination_page(), Some(&PdfObject::integer(0)));
        assert_eq!(dest.target(), Some(DestinationTarget::PageNumber(1)));
        assert!(dest.parameters().is_empty());
    }

    #[test]
    fn page_zero_is_the_first_page() {
        let dest = ExplicitDestination::fit(DestinationTarget::PageNumber(0));
        assert_eq!(dest.destination_page(), Some(&PdfObject::integer(0)));
        assert_eq!(dest.target(), Some(DestinationTarget::PageNumber(1)));
    }

    #[test]
    fn fit_r_keeps_all_four_sides() {
        let dest = ExplicitDestination::fit_r(DestinationTarget::PageNumber(2), 1.0, 2.0, 3.0, 4.0);
        assert_eq!(dest.object().to_string(), "[1 /FitR 1 2 3 4]");
    }

    #[test]
    fn single_parameter_kinds() {
        let page = DestinationTarget::PageNumber(1);
        assert_eq!(ExplicitDestination::fit_h(page, 5.0).object().to_string(), "[0 /FitH 5]");
        assert_eq!(ExplicitDestination::fit_v(page, 6.0).object().to_string(), "[0 /FitV 6]");
        assert_eq!(ExplicitDestination::fit_b(page).object().to_string(), "[0 /FitB]");
        assert_eq!(ExplicitDestination::fit_bh(page, 7.0).object().to_string(), "[0 /FitBH 7]");
    }

    #[test]
    fn fit_bv_uses_its_own_kind() {
        let dest = ExplicitDestination::fit_bv(DestinationTarget::PageNumber(1), 8.0);
        assert_eq!(dest.kind(), Some(&PdfName::FIT_BV));
        assert_eq!(dest.object().to_string(), "[0 /FitBV 8]");
    }

    #[test]
    fn create_omits_absent_parameters() {
        let dest = ExplicitDestination::create(
            DestinationTarget::PageNumber(1),
            PdfName::XYZ,
            None,
            None,
            None,
            Some(500.0),
            None,
        );
        assert_eq!(dest.object().to_string(), "[0 /XYZ 500]");
    }

    // -----------------------------------------------------------------------
    // Wrapping
    // -----------------------------------------------------------------------

    #[test]
    fn page_targets_point_at_page_objects() {
        let mut doc = PdfDocument::open_writing(InMemorySink::new(), DocumentConfig::default());
        let mut page = PdfDictionary::new();
        page.put(PdfName::TYPE, PdfName::PAGE.into());
        let page = doc.add_object(page.into()).unwrap();

        let dest = ExplicitDestination::fit(DestinationTarget::Page(page));
        assert_eq!(dest.destination_page().unwrap().as_reference(), Some(page));
        assert_eq!(dest.target(), Some(DestinationTarget::Page(page)));
        let resolved = dest.destination_page().unwrap().resolve(&doc).unwrap();
        assert!(resolved.as_dictionary().unwrap().is_of_type(&PdfName::PAGE, &doc));
    }

    #[test]
    fn destinations_stay_direct() {
        let dest = ExplicitDestination::fit(DestinationTarget::PageNumber(1));
        assert!(!ExplicitDestination::wrapped_must_be_indirect());
        assert!(!dest.into_object().is_indirect());
    }

    #[test]
    fn from_object_requires_an_array() {
        assert!(ExplicitDestination::from_object(PdfObject::integer(1)).is_none());
        let array = PdfArray::from_iter([PdfObject::integer(4), PdfName::FIT.into()]);
        let dest = ExplicitDestination::from_object(array.into()).unwrap();
        assert_eq!(dest.target(), Some(DestinationTarget::PageNumber(5)));
        assert_eq!(dest.kind(), Some(&PdfName::FIT));
    }
}
