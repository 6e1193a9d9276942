use std::fmt;

use crate::dictionary::PdfDictionary;
use crate::object::PdfObject;
use crate::scalar::PdfName;

/// A dictionary followed by raw bytes. Filters are applied by the serializer.
#[derive(Debug, Default, PartialEq)]
pub struct PdfStream {
    dictionary: PdfDictionary,
    data: Vec<u8>,
}

impl PdfStream {
    /// A stream with an empty dictionary.
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_dictionary(PdfDictionary::new(), data)
    }

    /// A stream with `dictionary`; `/Length` is set from `data`.
    pub fn with_dictionary(dictionary: PdfDictionary, data: Vec<u8>) -> Self {
        let mut stream = Self {
            dictionary,
            data: Vec::new(),
        };
        stream.set_data(data);
        stream
    }

    pub fn dictionary(&self) -> &PdfDictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut PdfDictionary {
        &mut self.dictionary
    }

    /// The raw payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the payload and keep `/Length` in step with it.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.dictionary
            .put(PdfName::LENGTH, PdfObject::integer(data.len() as i64));
        self.data = data;
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for PdfStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}stream[{} bytes]", self.dictionary, self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Detached;

    #[test]
    fn set_data_updates_length() {
        let mut stream = PdfStream::default();
        stream.set_data(b"BT ET".to_vec());
        assert_eq!(stream.len(), 5);
        let length = stream.dictionary().get_as_number(&PdfName::LENGTH, &Detached).unwrap();
        assert_eq!(length.int_value(), 5);
        assert_eq!(stream.to_string(), "<</Length 5>>stream[5 bytes]");
    }

    #[test]
    fn constructors_set_length() {
        let stream = PdfStream::new(b"q Q".to_vec());
        assert_eq!(stream.dictionary().get_raw(&PdfName::LENGTH), Some(&PdfObject::integer(3)));
    }
}
