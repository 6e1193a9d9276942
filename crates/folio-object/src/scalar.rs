//! Scalar node payloads: names, numbers, strings and literals.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A name token (`/Type`). Well-known names are available as constants.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PdfName(Cow<'static, str>);

impl PdfName {
    /// Document structure names.
    pub const TYPE: PdfName = PdfName::from_static("Type");
    pub const SUBTYPE: PdfName = PdfName::from_static("Subtype");
    pub const CATALOG: PdfName = PdfName::from_static("Catalog");
    pub const PAGE: PdfName = PdfName::from_static("Page");
    pub const PAGES: PdfName = PdfName::from_static("Pages");
    pub const KIDS: PdfName = PdfName::from_static("Kids");
    pub const RESOURCES: PdfName = PdfName::from_static("Resources");
    pub const MEDIA_BOX: PdfName = PdfName::from_static("MediaBox");
    pub const LENGTH: PdfName = PdfName::from_static("Length");
    pub const WIDGET: PdfName = PdfName::from_static("Widget");
    /// Explicit destination kinds.
    pub const XYZ: PdfName = PdfName::from_static("XYZ");
    pub const FIT: PdfName = PdfName::from_static("Fit");
    pub const FIT_H: PdfName = PdfName::from_static("FitH");
    pub const FIT_V: PdfName = PdfName::from_static("FitV");
    pub const FIT_R: PdfName = PdfName::from_static("FitR");
    pub const FIT_B: PdfName = PdfName::from_static("FitB");
    pub const FIT_BH: PdfName = PdfName::from_static("FitBH");
    pub const FIT_BV: PdfName = PdfName::from_static("FitBV");

    /// A name from a string known at compile time.
    pub const fn from_static(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// A name from `value`, without the leading slash.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl From<&str> for PdfName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A numeric value. Integers and reals share one representation; the
/// integer flag only affects rendering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PdfNumber {
    value: f64,
    integer: bool,
}

impl PdfNumber {
    /// A real number.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            integer: false,
        }
    }

    /// An integer.
    pub fn integer(value: i64) -> Self {
        Self {
            value: value as f64,
            integer: true,
        }
    }

    /// The value as a real.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The value truncated toward zero.
    pub fn int_value(&self) -> i64 {
        self.value as i64
    }

    /// Whether the value was given as an integer.
    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// True when the value lies within `i64` range.
    fn fits_integer(&self) -> bool {
        self.value >= i64::MIN as f64 && self.value < i64::MAX as f64
    }

    /// Replace the value. The number becomes a real.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.integer = false;
    }
}

impl Default for PdfNumber {
    fn default() -> Self {
        Self::integer(0)
    }
}

impl fmt::Display for PdfNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fits_integer() && (self.integer || self.value.fract() == 0.0) {
            write!(f, "{}", self.value as i64)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// A string value. Encoding is the serializer's concern.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PdfString(String);

impl PdfString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0)
    }
}

/// Pre-rendered content emitted verbatim by the serializer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PdfLiteral(String);

impl PdfLiteral {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PdfLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_and_owned_names_compare_equal() {
        assert_eq!(PdfName::TYPE, PdfName::new("Type"));
        assert_eq!(PdfName::from("Page"), PdfName::PAGE);
        assert_eq!(PdfName::CATALOG.to_string(), "/Catalog");
    }

    #[test]
    fn number_rendering() {
        assert_eq!(PdfNumber::integer(42).to_string(), "42");
        assert_eq!(PdfNumber::new(1.5).to_string(), "1.5");
        assert_eq!(PdfNumber::new(3.0).to_string(), "3");
        assert_eq!(PdfNumber::new(2.75).int_value(), 2);
    }

    #[test]
    fn whole_reals_beyond_i64_render_in_full() {
        assert_eq!(PdfNumber::new(1e30).to_string(), "1000000000000000000000000000000");
        assert_eq!(PdfNumber::new(-1e19).to_string(), "-10000000000000000000");
        assert_eq!(PdfNumber::new(-4096.0).to_string(), "-4096");
    }

    #[test]
    fn set_value_drops_integer_flag() {
        let mut n = PdfNumber::integer(1);
        n.set_value(0.25);
        assert!(!n.is_integer());
        assert_eq!(n.value(), 0.25);
    }

    #[test]
    fn name_serde_roundtrip() {
        let name = PdfName::new("Resources");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Resources\"");
        let parsed: PdfName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, PdfName::RESOURCES);
    }
}
