//! Ruby marshal (format 4.8) object graph codec
//!
//! RPG Maker XP, VX and VX Ace store every data file as a marshalled object
//! graph. This module decodes such a stream into a generic [`Value`] tree
//! without needing the engine's class definitions, and encodes it back.
//!
//! Decoding then encoding an unmodified graph reproduces the input byte for
//! byte: symbol backreferences are recomputed in the same first-use order the
//! engine used, object backreferences are kept verbatim as [`Value::Link`],
//! and floats keep their textual stream form.
//!
//! Supported tags: `0 T F i l f " : ; [ { o u @ I`. Anything else is
//! rejected with [`Error::UnsupportedTag`](crate::Error::UnsupportedTag).

mod fixed;
pub mod json;
mod reader;
mod symbol_table;
mod value;
mod writer;

pub use fixed::{FixedKind, FixedValue, Rect, Rgba, Table, decode_fixed, encode_fixed};
pub use reader::{decode, read_marshal};
pub use symbol_table::SymbolTable;
pub use value::{Bignum, Float, RString, Record, Symbol, TextEncoding, UserData, Value};
pub use writer::{encode, write_marshal};

/// Format version written by Ruby 1.8 and later
pub const MARSHAL_MAJOR: u8 = 4;
pub const MARSHAL_MINOR: u8 = 8;

pub(crate) const TYPE_NIL: u8 = b'0';
pub(crate) const TYPE_TRUE: u8 = b'T';
pub(crate) const TYPE_FALSE: u8 = b'F';
pub(crate) const TYPE_FIXNUM: u8 = b'i';
pub(crate) const TYPE_BIGNUM: u8 = b'l';
pub(crate) const TYPE_FLOAT: u8 = b'f';
pub(crate) const TYPE_STRING: u8 = b'"';
pub(crate) const TYPE_SYMBOL: u8 = b':';
pub(crate) const TYPE_SYMLINK: u8 = b';';
pub(crate) const TYPE_ARRAY: u8 = b'[';
pub(crate) const TYPE_HASH: u8 = b'{';
pub(crate) const TYPE_OBJECT: u8 = b'o';
pub(crate) const TYPE_USERDEF: u8 = b'u';
pub(crate) const TYPE_LINK: u8 = b'@';
pub(crate) const TYPE_IVAR: u8 = b'I';

/// Ivar carrying the UTF-8 (`true`) / US-ASCII (`false`) flag
pub(crate) const ENCODING_SHORT: &str = "E";
/// Ivar carrying an explicit encoding name
pub(crate) const ENCODING_LONG: &str = "encoding";
