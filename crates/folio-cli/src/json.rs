//! JSON object tables: the CLI's on-disk document format.
//!
//! ```json
//! { "restricted": false,
//!   "objects": [ { "number": 1, "generation": 0,
//!                  "value": { "array": [ { "ref": [2, 0] }, { "int": 7 } ] } } ] }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use folio_doc::{InMemorySource, ObjectSink};
use folio_object::{
    DocumentId, IndirectReference, ObjectKey, PdfArray, PdfDictionary, PdfName, PdfNumber, PdfObject, PdfStream,
    PdfValue,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JsonDocument {
    /// Opened without owner permission: copying out is refused.
    #[serde(default)]
    pub restricted: bool,
    pub objects: Vec<JsonEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEntry {
    pub number: u32,
    #[serde(default)]
    pub generation: u16,
    pub value: WireValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Name(String),
    String(String),
    Literal(String),
    Array(Vec<WireValue>),
    Dict(BTreeMap<String, WireValue>),
    Stream {
        dict: BTreeMap<String, WireValue>,
        data: Vec<u8>,
    },
    /// `[number, generation]`
    Ref(u32, u16),
}

impl WireValue {
    /// Build a node. References are attached to `document`.
    pub fn to_object(&self, document: DocumentId) -> PdfObject {
        match self {
            Self::Null => PdfObject::null(),
            Self::Bool(b) => PdfObject::boolean(*b),
            Self::Int(i) => PdfObject::integer(*i),
            Self::Real(r) => PdfObject::number(*r),
            Self::Name(n) => PdfObject::name(n.as_str()),
            Self::String(s) => PdfObject::string(s.as_str()),
            Self::Literal(l) => PdfObject::literal(l.as_str()),
            Self::Array(items) => items.iter().map(|item| item.to_object(document)).collect::<PdfArray>().into(),
            Self::Dict(entries) => to_dictionary(entries, document).into(),
            Self::Stream { dict, data } => PdfStream::with_dictionary(to_dictionary(dict, document), data.clone()).into(),
            Self::Ref(number, generation) => {
                PdfObject::reference(IndirectReference::new(document, *number, *generation))
            }
        }
    }

    /// Describe a node. References keep only their number and generation.
    pub fn from_object(object: &PdfObject) -> Self {
        match object.value() {
            PdfValue::Null => Self::Null,
            PdfValue::Boolean(b) => Self::Bool(*b),
            PdfValue::Number(n) => from_number(n),
            PdfValue::Name(n) => Self::Name(n.as_str().to_owned()),
            PdfValue::String(s) => Self::String(s.as_str().to_owned()),
            PdfValue::Literal(l) => Self::Literal(l.as_str().to_owned()),
            PdfValue::Array(items) => Self::Array(items.iter().map(Self::from_object).collect()),
            PdfValue::Dictionary(dict) => Self::Dict(from_dictionary(dict)),
            PdfValue::Stream(stream) => Self::Stream {
                dict: from_dictionary(stream.dictionary()),
                data: stream.data().to_vec(),
            },
            PdfValue::Reference(r) => Self::Ref(r.object_number(), r.generation()),
        }
    }
}

fn to_dictionary(entries: &BTreeMap<String, WireValue>, document: DocumentId) -> PdfDictionary {
    entries
        .iter()
        .map(|(key, value)| (PdfName::new(key.as_str()), value.to_object(document)))
        .collect()
}

fn from_dictionary(dict: &PdfDictionary) -> BTreeMap<String, WireValue> {
    dict.iter()
        .map(|(key, value)| (key.as_str().to_owned(), WireValue::from_object(value)))
        .collect()
}

fn from_number(number: &PdfNumber) -> WireValue {
    if number.is_integer() {
        WireValue::Int(number.int_value())
    } else {
        WireValue::Real(number.value())
    }
}

impl JsonDocument {
    /// Read a table from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write the table to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    /// An object source serving this table.
    pub fn into_source(self) -> InMemorySource {
        let source = if self.restricted {
            InMemorySource::restricted()
        } else {
            InMemorySource::new()
        };
        // Reference ids are rebased by the source when read.
        let placeholder = DocumentId::generate();
        for entry in self.objects {
            let key = ObjectKey::new(entry.number, entry.generation);
            source.insert(key, entry.value.to_object(placeholder));
        }
        source
    }
}

/// Sink collecting flushed objects and saving them as a JSON table when the
/// document is closed.
pub struct JsonSink {
    path: PathBuf,
    document: JsonDocument,
}

impl JsonSink {
    /// Sink saving to `path` on finish.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: JsonDocument::default(),
        }
    }
}

impl ObjectSink for JsonSink {
    fn write_object(&mut self, reference: IndirectReference, object: &PdfObject, _in_object_stream: bool) -> io::Result<()> {
        self.document.objects.push(JsonEntry {
            number: reference.object_number(),
            generation: reference.generation(),
            value: WireValue::from_object(object),
        });
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.document.objects.sort_by_key(|entry| (entry.number, entry.generation));
        self.document.save(&self.path)
    }
}
