//! Decoded marshal value definitions

use std::borrow::Cow;

use super::ENCODING_SHORT;
use super::fixed::FixedValue;
use crate::error::{Error, Result};

/// Source character encoding attached to a string.
///
/// Ruby 1.9+ streams wrap strings in an ivar block carrying either `:E`
/// (`true` = UTF-8, `false` = US-ASCII) or `:encoding` with an explicit name.
/// Strings without the wrapper are binary (`ASCII-8BIT`), which is also how
/// every string in an XP/VX (Ruby 1.8) stream is stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Binary,
    Utf8,
    UsAscii,
    Named(String),
}

/// A marshalled `String` with its encoding tag and any extra ivars.
#[derive(Debug, Clone, PartialEq)]
pub struct RString {
    pub bytes: Vec<u8>,
    pub encoding: TextEncoding,
    /// Instance variables other than the encoding marker, in stream order.
    pub ivars: Vec<(String, Value)>,
}

impl RString {
    pub fn new(bytes: Vec<u8>, encoding: TextEncoding) -> Self {
        Self {
            bytes,
            encoding,
            ivars: Vec::new(),
        }
    }

    /// A UTF-8 tagged string, the way an Ace project stores text.
    pub fn utf8(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec(), TextEncoding::Utf8)
    }

    /// An untagged string, the way XP/VX projects and binary blobs are stored.
    pub fn binary(bytes: Vec<u8>) -> Self {
        Self::new(bytes, TextEncoding::Binary)
    }

    /// Whether the stream carries an `I` wrapper for this string.
    pub fn has_ivars(&self) -> bool {
        self.encoding != TextEncoding::Binary || !self.ivars.is_empty()
    }

    /// Decode the bytes as text.
    ///
    /// Returns `None` when the bytes are not valid in the tagged encoding.
    /// Binary strings are treated as UTF-8, which is what RGSS1/2 projects use.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match &self.encoding {
            TextEncoding::Named(name) => {
                let encoding = encoding_rs::Encoding::for_label(name.as_bytes())?;
                encoding.decode_without_bom_handling_and_without_replacement(&self.bytes)
            }
            _ => std::str::from_utf8(&self.bytes).ok().map(Cow::Borrowed),
        }
    }

    /// Replace the content with `text`.
    ///
    /// The original tag is kept while the content is plain ASCII. Once
    /// non-ASCII text is written the string is tagged as UTF-8, including
    /// strings that were untagged before.
    pub fn set_text(&mut self, text: &str) {
        if !text.is_ascii() {
            self.encoding = TextEncoding::Utf8;
        }
        self.bytes = text.as_bytes().to_vec();
    }
}

/// A marshalled `Symbol`, kept as the raw bytes of the stream.
///
/// Ruby 1.9+ wraps non-ASCII symbols in an ivar block naming their encoding,
/// while Ruby 1.8 writes the bytes bare (often Shift_JIS). `ivars` holds the
/// wrapper as read; an empty list means the symbol is written bare.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub bytes: Vec<u8>,
    pub ivars: Vec<(String, Value)>,
}

impl Symbol {
    /// A symbol written without an ivar wrapper.
    pub fn bare(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ivars: Vec::new(),
        }
    }

    pub fn is_wrapped(&self) -> bool {
        !self.ivars.is_empty()
    }

    /// Symbol name for display and lookups. Invalid UTF-8 is replaced.
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Non-ASCII names get the UTF-8 wrapper an Ace stream would write.
impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        let mut symbol = Self::bare(name.as_bytes().to_vec());
        if !name.is_ascii() {
            symbol.ivars.push((ENCODING_SHORT.to_string(), Value::Bool(true)));
        }
        symbol
    }
}

/// A marshalled `Float`, kept together with its textual stream form.
#[derive(Debug, Clone)]
pub struct Float {
    pub value: f64,
    repr: Vec<u8>,
}

impl Float {
    pub(crate) fn from_repr(repr: Vec<u8>) -> Self {
        // 1.8 streams may append mantissa bytes after a NUL
        let text_end = repr.iter().position(|&b| b == 0).unwrap_or(repr.len());
        let text = String::from_utf8_lossy(&repr[..text_end]);
        let value = match text.as_ref() {
            "inf" => f64::INFINITY,
            "-inf" => f64::NEG_INFINITY,
            "nan" => f64::NAN,
            other => other.parse().unwrap_or(0.0),
        };
        Self { value, repr }
    }

    pub fn new(value: f64) -> Self {
        let repr = if value.is_nan() {
            "nan".to_string()
        } else if value.is_infinite() {
            if value > 0.0 { "inf" } else { "-inf" }.to_string()
        } else if value.fract() == 0.0 && value.abs() < 1e16 {
            format!("{value:.0}")
        } else {
            format!("{value}")
        };
        Self {
            value,
            repr: repr.into_bytes(),
        }
    }

    pub fn repr(&self) -> &[u8] {
        &self.repr
    }
}

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

/// A marshalled `Bignum` as sign plus little-endian magnitude bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bignum {
    pub negative: bool,
    /// Always an even number of bytes (the stream counts 16-bit words).
    pub magnitude: Vec<u8>,
}

impl Bignum {
    pub fn to_i128(&self) -> Option<i128> {
        let significant = self
            .magnitude
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        if significant > 15 {
            return None;
        }
        let mut value: i128 = 0;
        for (i, byte) in self.magnitude[..significant].iter().enumerate() {
            value |= i128::from(*byte) << (8 * i);
        }
        Some(if self.negative { -value } else { value })
    }
}

/// A generic class instance: class name plus ordered instance variables.
///
/// Field names are stored as they appear in the stream (`@name`).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub class: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: Vec::new(),
        }
    }

    fn matches(stored: &str, name: &str) -> bool {
        stored.strip_prefix('@').unwrap_or(stored) == name
    }

    /// Look up an instance variable by name, with or without the `@`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = name.strip_prefix('@').unwrap_or(name);
        self.fields
            .iter()
            .find(|(field, _)| Self::matches(field, name))
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let name = name.strip_prefix('@').unwrap_or(name);
        self.fields
            .iter_mut()
            .find(|(field, _)| Self::matches(field, name))
            .map(|(_, value)| value)
    }

    /// Like [`Record::get`] but reports a missing field as an error.
    pub fn field(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| Error::FieldNotFound {
            class: self.class.clone(),
            field: name.to_string(),
        })
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Value> {
        let class = self.class.clone();
        self.get_mut(name).ok_or(Error::FieldNotFound {
            class,
            field: name.to_string(),
        })
    }

    /// Set a field, appending it when the record does not carry it yet.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.get_mut(name) {
            *slot = value;
        } else {
            let name = name.strip_prefix('@').unwrap_or(name);
            self.fields.push((format!("@{name}"), value));
        }
    }

    /// Field names without the `@` prefix, in stream order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(|(name, _)| name.strip_prefix('@').unwrap_or(name))
    }
}

/// A `_dump`-serialized instance of a class without a registered layout.
#[derive(Debug, Clone, PartialEq)]
pub struct UserData {
    pub class: String,
    pub bytes: Vec<u8>,
    pub ivars: Vec<(String, Value)>,
}

/// One node of a decoded object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Bignum(Bignum),
    Float(Float),
    Str(RString),
    Symbol(Symbol),
    Array(Vec<Value>),
    /// Hash entries in insertion order.
    Hash(Vec<(Value, Value)>),
    Object(Record),
    Fixed(FixedValue),
    UserData(UserData),
    /// Backreference to the n-th object of the stream.
    Link(usize),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_rstring(&self) -> Option<&RString> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_rstring_mut(&mut self) -> Option<&mut RString> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text content of a string value, if it decodes.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        self.as_rstring().and_then(RString::to_text)
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Hash(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Shorthand for a record field lookup on an object value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_record().and_then(|record| record.get(name))
    }

    /// Short type label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Bignum(_) => "bignum",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
            Value::Object(_) => "object",
            Value::Fixed(_) => "fixed",
            Value::UserData(_) => "user data",
            Value::Link(_) => "link",
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Str(RString::utf8(text))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record)
    }
}
