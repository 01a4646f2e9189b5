//! Marshal stream reading and parsing

use byteorder::ReadBytesExt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use super::fixed::{FixedKind, decode_fixed};
use super::value::{Bignum, Float, RString, Record, Symbol, TextEncoding, UserData, Value};
use super::{
    ENCODING_LONG, ENCODING_SHORT, MARSHAL_MAJOR, MARSHAL_MINOR, TYPE_ARRAY, TYPE_BIGNUM,
    TYPE_FALSE, TYPE_FIXNUM, TYPE_FLOAT, TYPE_HASH, TYPE_IVAR, TYPE_LINK, TYPE_NIL, TYPE_OBJECT,
    TYPE_STRING, TYPE_SYMBOL, TYPE_SYMLINK, TYPE_TRUE, TYPE_USERDEF,
};
use crate::error::{Error, Result};

/// Read and decode a marshalled data file from disk
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid stream.
pub fn read_marshal<P: AsRef<Path>>(path: P) -> Result<Value> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    decode(&buffer)
}

/// Decode a marshal stream into a value graph
///
/// # Errors
/// Returns [`Error::InvalidMarshalVersion`] for a bad header,
/// [`Error::UnsupportedTag`] for tags outside the supported set,
/// [`Error::TruncatedStream`] when the data ends mid-value and
/// [`Error::MalformedFixedValue`] for inconsistent Table/Color/Tone/Rect payloads.
pub fn decode(data: &[u8]) -> Result<Value> {
    let mut reader = MarshalReader::new(data);

    let major = reader.byte()?;
    let minor = reader.byte()?;
    if major != MARSHAL_MAJOR || minor > MARSHAL_MINOR {
        return Err(Error::InvalidMarshalVersion { major, minor });
    }

    let value = reader.read_value()?;
    if reader.remaining() > 0 {
        tracing::debug!("{} trailing bytes after marshal stream", reader.remaining());
    }
    Ok(value)
}

struct MarshalReader<'a> {
    cursor: Cursor<&'a [u8]>,
    /// Symbols in stream order (targets for `;` links)
    symbols: Vec<Symbol>,
    /// Number of objects registered so far (targets for `@` links)
    objects: usize,
}

impl<'a> MarshalReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
            symbols: Vec::new(),
            objects: 0,
        }
    }

    fn offset(&self) -> usize {
        self.cursor.position() as usize
    }

    fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.offset())
    }

    fn truncated(&self) -> Error {
        Error::TruncatedStream {
            offset: self.offset(),
        }
    }

    fn byte(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(|_| self.truncated())
    }

    fn register(&mut self) {
        self.objects += 1;
    }

    /// Read a packed integer (`w_long` encoding).
    fn read_long(&mut self) -> Result<i64> {
        let c = self.cursor.read_i8().map_err(|_| self.truncated())?;
        let c = i64::from(c);
        Ok(match c {
            0 => 0,
            5.. => c - 5,
            ..=-5 => c + 5,
            1..=4 => {
                let mut x: i64 = 0;
                for i in 0..c {
                    x |= i64::from(self.byte()?) << (8 * i);
                }
                x
            }
            _ => {
                let mut x: i64 = -1;
                for i in 0..-c {
                    x &= !(0xff << (8 * i));
                    x |= i64::from(self.byte()?) << (8 * i);
                }
                x
            }
        })
    }

    /// Read a length that must fit in the remaining input.
    fn read_len(&mut self, unit: usize) -> Result<usize> {
        let offset = self.offset();
        let len = self.read_long()?;
        let len = usize::try_from(len).map_err(|_| Error::TruncatedStream { offset })?;
        if len.saturating_mul(unit) > self.remaining() {
            return Err(Error::TruncatedStream {
                offset: self.cursor.get_ref().len(),
            });
        }
        Ok(len)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        if len > self.remaining() {
            return Err(Error::TruncatedStream {
                offset: self.cursor.get_ref().len(),
            });
        }
        let mut buffer = vec![0u8; len];
        self.cursor
            .read_exact(&mut buffer)
            .map_err(|_| self.truncated())?;
        Ok(buffer)
    }

    /// Read a length-prefixed byte sequence.
    fn read_byte_seq(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len(1)?;
        self.read_bytes(len)
    }

    /// Read the bytes of a `:` symbol and register it. A wrapped symbol is
    /// registered before its ivars are read, matching the stream's indices.
    fn read_symbol_body(&mut self, wrapped: bool) -> Result<Symbol> {
        let bytes = self.read_byte_seq()?;
        let idx = self.symbols.len();
        self.symbols.push(Symbol::bare(bytes));
        if wrapped {
            let ivars = self.read_ivars()?;
            self.symbols[idx].ivars = ivars;
        }
        Ok(self.symbols[idx].clone())
    }

    fn read_symlink(&mut self) -> Result<Symbol> {
        let idx = self.read_long()?;
        usize::try_from(idx)
            .ok()
            .and_then(|idx| self.symbols.get(idx))
            .cloned()
            .ok_or(Error::InvalidSymbolLink(idx.max(0) as usize))
    }

    /// Read a symbol in a position where only a symbol may appear
    /// (class names and ivar names).
    fn read_symbol(&mut self) -> Result<Symbol> {
        let offset = self.offset();
        match self.byte()? {
            TYPE_SYMBOL => self.read_symbol_body(false),
            TYPE_SYMLINK => self.read_symlink(),
            TYPE_IVAR => {
                let inner_offset = self.offset();
                let inner = self.byte()?;
                if inner != TYPE_SYMBOL {
                    return Err(Error::UnsupportedTag {
                        tag: inner,
                        offset: inner_offset,
                    });
                }
                self.read_symbol_body(true)
            }
            tag => Err(Error::UnsupportedTag { tag, offset }),
        }
    }

    fn read_name(&mut self) -> Result<String> {
        Ok(self.read_symbol()?.name().into_owned())
    }

    fn read_ivars(&mut self) -> Result<Vec<(String, Value)>> {
        let count = self.read_len(2)?;
        let mut ivars = Vec::with_capacity(count);
        for _ in 0..count {
            let name = self.read_name()?;
            let value = self.read_value()?;
            ivars.push((name, value));
        }
        Ok(ivars)
    }

    fn read_value(&mut self) -> Result<Value> {
        let offset = self.offset();
        let tag = self.byte()?;

        match tag {
            TYPE_NIL => Ok(Value::Nil),
            TYPE_TRUE => Ok(Value::Bool(true)),
            TYPE_FALSE => Ok(Value::Bool(false)),
            TYPE_FIXNUM => Ok(Value::Integer(self.read_long()?)),
            TYPE_BIGNUM => {
                let sign = self.byte()?;
                let words = self.read_len(2)?;
                let magnitude = self.read_bytes(words * 2)?;
                self.register();
                Ok(Value::Bignum(Bignum {
                    negative: sign == b'-',
                    magnitude,
                }))
            }
            TYPE_FLOAT => {
                let repr = self.read_byte_seq()?;
                self.register();
                Ok(Value::Float(Float::from_repr(repr)))
            }
            TYPE_STRING => {
                let bytes = self.read_byte_seq()?;
                self.register();
                Ok(Value::Str(RString::binary(bytes)))
            }
            TYPE_SYMBOL => Ok(Value::Symbol(self.read_symbol_body(false)?)),
            TYPE_SYMLINK => Ok(Value::Symbol(self.read_symlink()?)),
            TYPE_ARRAY => {
                let len = self.read_len(1)?;
                self.register();
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_value()?);
                }
                Ok(Value::Array(items))
            }
            TYPE_HASH => {
                let len = self.read_len(2)?;
                self.register();
                let mut entries = Vec::with_capacity(len);
                for _ in 0..len {
                    let key = self.read_value()?;
                    let value = self.read_value()?;
                    entries.push((key, value));
                }
                Ok(Value::Hash(entries))
            }
            TYPE_OBJECT => {
                let class = self.read_name()?;
                self.register();
                let fields = self.read_ivars()?;
                Ok(Value::Object(Record { class, fields }))
            }
            TYPE_USERDEF => self.read_userdef(false),
            TYPE_LINK => {
                let idx = self.read_long()?;
                match usize::try_from(idx) {
                    Ok(idx) if idx < self.objects => Ok(Value::Link(idx)),
                    _ => Err(Error::InvalidObjectLink(idx.max(0) as usize)),
                }
            }
            TYPE_IVAR => self.read_ivar_wrapped(),
            _ => Err(Error::UnsupportedTag { tag, offset }),
        }
    }

    /// `u`: class symbol plus an opaque `_dump` payload. Registered after
    /// the payload, as the engine's loader does.
    fn read_userdef(&mut self, with_ivars: bool) -> Result<Value> {
        let class = self.read_name()?;
        let bytes = self.read_byte_seq()?;
        let ivars = if with_ivars {
            self.read_ivars()?
        } else {
            Vec::new()
        };

        let value = match FixedKind::from_class(&class) {
            Some(kind) if ivars.is_empty() => Value::Fixed(decode_fixed(kind, &bytes)?),
            _ => Value::UserData(UserData {
                class,
                bytes,
                ivars,
            }),
        };
        self.register();
        Ok(value)
    }

    fn read_ivar_wrapped(&mut self) -> Result<Value> {
        let offset = self.offset();
        match self.byte()? {
            TYPE_STRING => {
                let bytes = self.read_byte_seq()?;
                self.register();
                let raw = self.read_ivars()?;

                let mut string = RString::binary(bytes);
                for (name, value) in raw {
                    let untagged = string.encoding == TextEncoding::Binary;
                    match value {
                        Value::Bool(utf8) if untagged && name == ENCODING_SHORT => {
                            string.encoding = if utf8 {
                                TextEncoding::Utf8
                            } else {
                                TextEncoding::UsAscii
                            };
                        }
                        Value::Str(ref enc) if untagged && name == ENCODING_LONG => {
                            string.encoding = TextEncoding::Named(
                                String::from_utf8_lossy(&enc.bytes).into_owned(),
                            );
                        }
                        value => string.ivars.push((name, value)),
                    }
                }
                Ok(Value::Str(string))
            }
            TYPE_SYMBOL => Ok(Value::Symbol(self.read_symbol_body(true)?)),
            TYPE_USERDEF => self.read_userdef(true),
            tag => Err(Error::UnsupportedTag { tag, offset }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(body: &[u8]) -> Vec<u8> {
        let mut data = vec![4, 8];
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_packed_integers() {
        assert_eq!(decode(&stream(b"i\x00")).unwrap(), Value::Integer(0));
        assert_eq!(decode(&stream(b"i\x06")).unwrap(), Value::Integer(1));
        assert_eq!(decode(&stream(b"i\xfa")).unwrap(), Value::Integer(-1));
        assert_eq!(decode(&stream(b"i\x01\xc8")).unwrap(), Value::Integer(200));
        assert_eq!(decode(&stream(b"i\x02\x2c\x01")).unwrap(), Value::Integer(300));
        assert_eq!(decode(&stream(b"i\xff\x38")).unwrap(), Value::Integer(-200));
    }

    #[test]
    fn test_utf8_string() {
        let value = decode(&stream(b"I\"\x07ab\x06:\x06ET")).unwrap();
        let Value::Str(s) = value else {
            panic!("expected string");
        };
        assert_eq!(s.bytes, b"ab");
        assert_eq!(s.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_object_with_symlinks() {
        // [#<Foo @a=1>, #<Foo @a=2>]
        let data = stream(b"[\x07o:\x08Foo\x06:\x07@ai\x06o;\x00\x06;\x06i\x07");
        let value = decode(&data).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        let second = items[1].as_record().unwrap();
        assert_eq!(second.class, "Foo");
        assert_eq!(second.get("a"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_legacy_symbol_keeps_bytes() {
        // :あ in Shift_JIS, as a Ruby 1.8 stream writes it
        let value = decode(&stream(b":\x07\x82\xa0")).unwrap();
        assert_eq!(value, Value::Symbol(Symbol::bare(vec![0x82, 0xA0])));
    }

    #[test]
    fn test_wrapped_symbol_link_keeps_wrapper() {
        // [:あ, :あ] with the UTF-8 wrapper on first use
        let data = stream(b"[\x07I:\x08\xe3\x81\x82\x06:\x06ET;\x00");
        let value = decode(&data).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items[0], Value::Symbol(Symbol::from("あ")));
        assert_eq!(items[1], items[0]);
    }

    #[test]
    fn test_unsupported_tag() {
        let err = decode(&stream(b"/\x06a\x00")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedTag { tag: b'/', offset: 2 }));
    }

    #[test]
    fn test_truncated_stream() {
        let err = decode(&stream(b"[\x07i\x06")).unwrap_err();
        assert!(matches!(err, Error::TruncatedStream { .. }));
        let err = decode(&stream(b"\"\x0aab")).unwrap_err();
        assert!(matches!(err, Error::TruncatedStream { .. }));
    }

    #[test]
    fn test_bad_version() {
        assert!(matches!(
            decode(&[3, 0, b'0']).unwrap_err(),
            Error::InvalidMarshalVersion { major: 3, minor: 0 }
        ));
    }

    #[test]
    fn test_link_must_point_backwards() {
        assert!(matches!(
            decode(&stream(b"[\x07@\x00@\x06")).unwrap_err(),
            Error::InvalidObjectLink(1)
        ));
    }
}
