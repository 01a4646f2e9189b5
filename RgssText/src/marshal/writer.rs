//! Marshal stream writing

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::fixed::encode_fixed;
use super::symbol_table::SymbolTable;
use super::value::{Bignum, RString, Symbol, TextEncoding, Value};
use super::{
    ENCODING_LONG, ENCODING_SHORT, MARSHAL_MAJOR, MARSHAL_MINOR, TYPE_ARRAY, TYPE_BIGNUM,
    TYPE_FALSE, TYPE_FIXNUM, TYPE_FLOAT, TYPE_HASH, TYPE_IVAR, TYPE_LINK, TYPE_NIL, TYPE_OBJECT,
    TYPE_STRING, TYPE_SYMBOL, TYPE_SYMLINK, TYPE_TRUE, TYPE_USERDEF,
};
use crate::error::Result;

/// Encode a value graph and write it to disk
///
/// # Errors
/// Returns an error if file writing fails.
pub fn write_marshal<P: AsRef<Path>>(path: P, value: &Value) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&encode(value))?;
    writer.flush()?;
    Ok(())
}

/// Encode a value graph into a marshal stream
pub fn encode(value: &Value) -> Vec<u8> {
    let mut writer = MarshalWriter::default();
    writer.out.push(MARSHAL_MAJOR);
    writer.out.push(MARSHAL_MINOR);
    writer.write_value(value);
    writer.out
}

#[derive(Default)]
struct MarshalWriter {
    out: Vec<u8>,
    symbols: SymbolTable,
}

impl MarshalWriter {
    fn byte(&mut self, b: u8) {
        self.out.push(b);
    }

    /// Packed integer (`w_long` encoding).
    fn write_long(&mut self, x: i64) {
        if x == 0 {
            self.byte(0);
        } else if 0 < x && x < 123 {
            self.byte((x + 5) as u8);
        } else if -124 < x && x < 0 {
            self.byte(((x - 5) & 0xff) as u8);
        } else {
            let mut buf = [0u8; 9];
            let mut v = x;
            let mut len = 0usize;
            for (i, slot) in buf.iter_mut().enumerate().skip(1) {
                *slot = (v & 0xff) as u8;
                v >>= 8;
                if v == 0 {
                    buf[0] = i as u8;
                    len = i;
                    break;
                }
                if v == -1 {
                    buf[0] = (-(i as i8)) as u8;
                    len = i;
                    break;
                }
            }
            self.out.extend_from_slice(&buf[..=len]);
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_long(bytes.len() as i64);
        self.out.extend_from_slice(bytes);
    }

    fn write_symlink(&mut self, idx: usize) {
        self.byte(TYPE_SYMLINK);
        self.write_long(idx as i64);
    }

    /// Write a symbol value, with its ivar wrapper only if it carries one.
    fn write_symbol(&mut self, symbol: &Symbol) {
        let (idx, is_new) = self.symbols.intern(&symbol.bytes);
        if !is_new {
            self.write_symlink(idx);
            return;
        }

        let wrapped = symbol.is_wrapped();
        if wrapped {
            self.byte(TYPE_IVAR);
        }
        self.byte(TYPE_SYMBOL);
        self.write_bytes(&symbol.bytes);
        if wrapped {
            self.write_long(symbol.ivars.len() as i64);
            self.write_ivars(&symbol.ivars);
        }
    }

    /// Write a class or ivar name.
    fn write_name(&mut self, name: &str) {
        match self.symbols.index_of(name.as_bytes()) {
            Some(idx) => self.write_symlink(idx),
            None => self.write_symbol(&Symbol::from(name)),
        }
    }

    fn write_ivars(&mut self, ivars: &[(String, Value)]) {
        for (name, value) in ivars {
            self.write_name(name);
            self.write_value(value);
        }
    }

    fn write_string(&mut self, string: &RString) {
        let wrapped = string.has_ivars();
        if wrapped {
            self.byte(TYPE_IVAR);
        }
        self.byte(TYPE_STRING);
        self.write_bytes(&string.bytes);
        if !wrapped {
            return;
        }

        let tagged = string.encoding != TextEncoding::Binary;
        self.write_long((string.ivars.len() + usize::from(tagged)) as i64);
        match &string.encoding {
            TextEncoding::Binary => {}
            TextEncoding::Utf8 => {
                self.write_name(ENCODING_SHORT);
                self.byte(TYPE_TRUE);
            }
            TextEncoding::UsAscii => {
                self.write_name(ENCODING_SHORT);
                self.byte(TYPE_FALSE);
            }
            TextEncoding::Named(name) => {
                self.write_name(ENCODING_LONG);
                self.byte(TYPE_STRING);
                self.write_bytes(name.as_bytes());
            }
        }
        self.write_ivars(&string.ivars);
    }

    fn write_bignum(&mut self, big: &Bignum) {
        self.byte(TYPE_BIGNUM);
        self.byte(if big.negative { b'-' } else { b'+' });
        self.write_long((big.magnitude.len() / 2) as i64);
        self.out.extend_from_slice(&big.magnitude);
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Nil => self.byte(TYPE_NIL),
            Value::Bool(true) => self.byte(TYPE_TRUE),
            Value::Bool(false) => self.byte(TYPE_FALSE),
            Value::Integer(i) => {
                self.byte(TYPE_FIXNUM);
                self.write_long(*i);
            }
            Value::Bignum(big) => self.write_bignum(big),
            Value::Float(float) => {
                self.byte(TYPE_FLOAT);
                self.write_bytes(float.repr());
            }
            Value::Str(string) => self.write_string(string),
            Value::Symbol(symbol) => self.write_symbol(symbol),
            Value::Array(items) => {
                self.byte(TYPE_ARRAY);
                self.write_long(items.len() as i64);
                for item in items {
                    self.write_value(item);
                }
            }
            Value::Hash(entries) => {
                self.byte(TYPE_HASH);
                self.write_long(entries.len() as i64);
                for (key, value) in entries {
                    self.write_value(key);
                    self.write_value(value);
                }
            }
            Value::Object(record) => {
                self.byte(TYPE_OBJECT);
                self.write_name(&record.class);
                self.write_long(record.fields.len() as i64);
                self.write_ivars(&record.fields);
            }
            Value::Fixed(fixed) => {
                self.byte(TYPE_USERDEF);
                self.write_name(fixed.kind().class_name());
                self.write_bytes(&encode_fixed(fixed));
            }
            Value::UserData(data) => {
                let wrapped = !data.ivars.is_empty();
                if wrapped {
                    self.byte(TYPE_IVAR);
                }
                self.byte(TYPE_USERDEF);
                self.write_name(&data.class);
                self.write_bytes(&data.bytes);
                if wrapped {
                    self.write_long(data.ivars.len() as i64);
                    self.write_ivars(&data.ivars);
                }
            }
            Value::Link(idx) => {
                self.byte(TYPE_LINK);
                self.write_long(*idx as i64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::{Record, decode};

    fn body(value: &Value) -> Vec<u8> {
        encode(value)[2..].to_vec()
    }

    fn stream_of(body: &[u8]) -> Vec<u8> {
        let mut data = vec![MARSHAL_MAJOR, MARSHAL_MINOR];
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_packed_integers() {
        assert_eq!(body(&Value::Integer(0)), b"i\x00");
        assert_eq!(body(&Value::Integer(122)), b"i\x7f");
        assert_eq!(body(&Value::Integer(123)), b"i\x01\x7b");
        assert_eq!(body(&Value::Integer(-123)), b"i\x80");
        assert_eq!(body(&Value::Integer(-124)), b"i\xff\x84");
        assert_eq!(body(&Value::Integer(256)), b"i\x02\x00\x01");
        assert_eq!(body(&Value::Integer(-256)), b"i\xff\x00");
        assert_eq!(body(&Value::Integer(-257)), b"i\xfe\xff\xfe");
    }

    #[test]
    fn test_symbols_are_linked_after_first_use() {
        let mut first = Record::new("Foo");
        first.set("a", Value::Integer(1));
        let mut second = Record::new("Foo");
        second.set("a", Value::Integer(2));
        let graph = Value::Array(vec![first.into(), second.into()]);

        assert_eq!(
            body(&graph),
            b"[\x07o:\x08Foo\x06:\x07@ai\x06o;\x00\x06;\x06i\x07".to_vec()
        );
    }

    #[test]
    fn test_symbols_keep_their_stream_form() {
        // Ruby 1.8: bare Shift_JIS bytes
        let legacy = stream_of(b":\x07\x82\xa0");
        assert_eq!(encode(&decode(&legacy).unwrap()), legacy);

        // [:あ, :あ] bare, then with the Ruby 1.9 wrapper
        let bare = stream_of(b"[\x07:\x08\xe3\x81\x82;\x00");
        assert_eq!(encode(&decode(&bare).unwrap()), bare);
        let wrapped = stream_of(b"[\x07I:\x08\xe3\x81\x82\x06:\x06ET;\x00");
        assert_eq!(encode(&decode(&wrapped).unwrap()), wrapped);
    }

    #[test]
    fn test_new_non_ascii_symbol_is_wrapped() {
        assert_eq!(
            body(&Value::Symbol(Symbol::from("あ"))),
            b"I:\x08\xe3\x81\x82\x06:\x06ET"
        );
    }

    #[test]
    fn test_string_encodings() {
        assert_eq!(body(&Value::from("ab")), b"I\"\x07ab\x06:\x06ET");
        assert_eq!(
            body(&Value::Str(RString::binary(b"ab".to_vec()))),
            b"\"\x07ab"
        );
        let sjis = RString::new(vec![0x82, 0xA0], TextEncoding::Named("Shift_JIS".into()));
        let encoded = encode(&Value::Str(sjis.clone()));
        assert_eq!(decode(&encoded).unwrap(), Value::Str(sjis));
    }

    #[test]
    fn test_integer_round_trip() {
        let samples = [
            0,
            1,
            -1,
            122,
            123,
            -123,
            -124,
            255,
            256,
            65535,
            65536,
            -65536,
            1 << 29,
            -(1 << 29),
        ];
        for i in samples {
            assert_eq!(decode(&encode(&Value::Integer(i))).unwrap(), Value::Integer(i));
        }
    }
}
