//! Fixed-layout `_dump` payloads: `Table`, `Color`, `Tone` and `Rect`
//!
//! All four are little-endian and have no framing beyond what the marshal
//! `u` tag already provides.
//!
//! | Type  | Layout |
//! |-------|--------|
//! | Table | `u32` dim, x, y, z, item count, then `u16` cells |
//! | Color | 4 x `f64` (r, g, b, a) |
//! | Tone  | 4 x `f64` (r, g, b, gray) |
//! | Rect  | 4 x `i32` (x, y, width, height) |

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::io::Cursor;

use crate::error::{Error, Result};

/// Size of the Table header (five `u32` fields)
const TABLE_HEADER_SIZE: usize = 20;

/// Size of a Color/Tone payload
const RGBA_SIZE: usize = 32;

/// Size of a Rect payload
const RECT_SIZE: usize = 16;

/// Which fixed layout a `_dump` class name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedKind {
    Table,
    Color,
    Tone,
    Rect,
}

impl FixedKind {
    /// Resolve a marshalled class name.
    pub fn from_class(name: &str) -> Option<Self> {
        match name {
            "Table" => Some(Self::Table),
            "Color" => Some(Self::Color),
            "Tone" => Some(Self::Tone),
            "Rect" => Some(Self::Rect),
            _ => None,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Color => "Color",
            Self::Tone => "Tone",
            Self::Rect => "Rect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub dim: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub data: Vec<u16>,
}

impl Table {
    /// Number of cells implied by the dimensions.
    pub fn item_count(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y) * u64::from(self.z)
    }

    /// Cell at (x, y, z), row-major with x varying fastest.
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<u16> {
        if x >= self.x || y >= self.y || z >= self.z {
            return None;
        }
        let index = (u64::from(z) * u64::from(self.y) + u64::from(y)) * u64::from(self.x)
            + u64::from(x);
        self.data.get(index as usize).copied()
    }
}

/// Four doubles shared by `Color` and `Tone`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A decoded fixed-layout value.
#[derive(Debug, Clone, PartialEq)]
pub enum FixedValue {
    Table(Table),
    Color(Rgba),
    Tone(Rgba),
    Rect(Rect),
}

impl FixedValue {
    pub fn kind(&self) -> FixedKind {
        match self {
            Self::Table(_) => FixedKind::Table,
            Self::Color(_) => FixedKind::Color,
            Self::Tone(_) => FixedKind::Tone,
            Self::Rect(_) => FixedKind::Rect,
        }
    }
}

fn malformed(kind: FixedKind, message: impl Into<String>) -> Error {
    Error::MalformedFixedValue {
        kind: kind.class_name(),
        message: message.into(),
    }
}

/// Decode a `_dump` payload of the given kind.
///
/// # Errors
/// Returns [`Error::MalformedFixedValue`] if the payload has the wrong size,
/// or for a Table whose stored item count disagrees with either `x*y*z` or
/// the number of trailing cells.
pub fn decode_fixed(kind: FixedKind, bytes: &[u8]) -> Result<FixedValue> {
    match kind {
        FixedKind::Table => decode_table(bytes).map(FixedValue::Table),
        FixedKind::Color => decode_rgba(kind, bytes).map(FixedValue::Color),
        FixedKind::Tone => decode_rgba(kind, bytes).map(FixedValue::Tone),
        FixedKind::Rect => decode_rect(bytes).map(FixedValue::Rect),
    }
}

fn decode_table(bytes: &[u8]) -> Result<Table> {
    let kind = FixedKind::Table;
    if bytes.len() < TABLE_HEADER_SIZE {
        return Err(malformed(
            kind,
            format!("{} bytes is shorter than the {TABLE_HEADER_SIZE}-byte header", bytes.len()),
        ));
    }

    let mut cursor = Cursor::new(bytes);
    let mut header = [0u32; 5];
    cursor
        .read_u32_into::<LittleEndian>(&mut header)
        .map_err(|e| malformed(kind, e.to_string()))?;
    let [dim, x, y, z, items] = header;

    let cell_bytes = bytes.len() - TABLE_HEADER_SIZE;
    if cell_bytes % 2 != 0 {
        return Err(malformed(kind, format!("odd cell payload length {cell_bytes}")));
    }
    let cell_count = cell_bytes / 2;

    let expected = u64::from(x) * u64::from(y) * u64::from(z);
    if u64::from(items) != expected {
        return Err(malformed(
            kind,
            format!("item count {items} does not match {x}x{y}x{z}"),
        ));
    }
    if items as usize != cell_count {
        return Err(malformed(
            kind,
            format!("item count {items} does not match {cell_count} stored cells"),
        ));
    }

    let mut data = vec![0u16; cell_count];
    cursor
        .read_u16_into::<LittleEndian>(&mut data)
        .map_err(|e| malformed(kind, e.to_string()))?;

    Ok(Table { dim, x, y, z, data })
}

fn decode_rgba(kind: FixedKind, bytes: &[u8]) -> Result<Rgba> {
    if bytes.len() != RGBA_SIZE {
        return Err(malformed(
            kind,
            format!("expected {RGBA_SIZE} bytes, found {}", bytes.len()),
        ));
    }
    let mut fields = [0f64; 4];
    Cursor::new(bytes)
        .read_f64_into::<LittleEndian>(&mut fields)
        .map_err(|e| malformed(kind, e.to_string()))?;
    let [r, g, b, a] = fields;
    Ok(Rgba { r, g, b, a })
}

fn decode_rect(bytes: &[u8]) -> Result<Rect> {
    let kind = FixedKind::Rect;
    if bytes.len() != RECT_SIZE {
        return Err(malformed(
            kind,
            format!("expected {RECT_SIZE} bytes, found {}", bytes.len()),
        ));
    }
    let mut fields = [0i32; 4];
    Cursor::new(bytes)
        .read_i32_into::<LittleEndian>(&mut fields)
        .map_err(|e| malformed(kind, e.to_string()))?;
    let [x, y, width, height] = fields;
    Ok(Rect { x, y, width, height })
}

/// Encode a fixed value back into its `_dump` payload.
///
/// The Table item count is always written as `x*y*z`, so encoding a table
/// whose cell vector was resized by hand produces a payload that will fail
/// to decode.
pub fn encode_fixed(value: &FixedValue) -> Vec<u8> {
    match value {
        FixedValue::Table(table) => {
            let mut out = Vec::with_capacity(TABLE_HEADER_SIZE + table.data.len() * 2);
            for field in [
                table.dim,
                table.x,
                table.y,
                table.z,
                table.item_count() as u32,
            ] {
                push_u32(&mut out, field);
            }
            for cell in &table.data {
                push_u16(&mut out, *cell);
            }
            out
        }
        FixedValue::Color(rgba) | FixedValue::Tone(rgba) => {
            let mut out = Vec::with_capacity(RGBA_SIZE);
            for field in [rgba.r, rgba.g, rgba.b, rgba.a] {
                push_f64(&mut out, field);
            }
            out
        }
        FixedValue::Rect(rect) => {
            let mut out = Vec::with_capacity(RECT_SIZE);
            for field in [rect.x, rect.y, rect.width, rect.height] {
                push_i32(&mut out, field);
            }
            out
        }
    }
}

// Writes into a Vec<u8> cannot fail
fn push_u32(out: &mut Vec<u8>, value: u32) {
    let _ = out.write_u32::<LittleEndian>(value);
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    let _ = out.write_u16::<LittleEndian>(value);
}

fn push_i32(out: &mut Vec<u8>, value: i32) {
    let _ = out.write_i32::<LittleEndian>(value);
}

fn push_f64(out: &mut Vec<u8>, value: f64) {
    let _ = out.write_f64::<LittleEndian>(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_bytes(header: [u32; 5], cells: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        for h in header {
            out.extend_from_slice(&h.to_le_bytes());
        }
        for c in cells {
            out.extend_from_slice(&c.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_table_round_trip() {
        let bytes = table_bytes([3, 2, 2, 1, 4], &[1, 2, 3, 0xFFFF]);
        let value = decode_fixed(FixedKind::Table, &bytes).unwrap();
        let FixedValue::Table(ref table) = value else {
            panic!("expected table");
        };
        assert_eq!(table.get(1, 1, 0), Some(0xFFFF));
        assert_eq!(table.get(2, 0, 0), None);
        assert_eq!(encode_fixed(&value), bytes);
    }

    #[test]
    fn test_table_count_disagrees_with_dimensions() {
        let bytes = table_bytes([3, 2, 2, 1, 3], &[1, 2, 3]);
        let err = decode_fixed(FixedKind::Table, &bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedFixedValue { kind: "Table", .. }));
    }

    #[test]
    fn test_table_count_disagrees_with_cells() {
        let bytes = table_bytes([3, 2, 2, 1, 4], &[1, 2, 3]);
        assert!(decode_fixed(FixedKind::Table, &bytes).is_err());
    }

    #[test]
    fn test_empty_table() {
        let bytes = table_bytes([1, 0, 1, 1, 0], &[]);
        let value = decode_fixed(FixedKind::Table, &bytes).unwrap();
        assert_eq!(encode_fixed(&value), bytes);
    }

    #[test]
    fn test_color_tone_rect_round_trip() {
        let color = FixedValue::Color(Rgba { r: 255.0, g: 128.5, b: 0.0, a: -1.25 });
        let encoded = encode_fixed(&color);
        assert_eq!(encoded.len(), RGBA_SIZE);
        assert_eq!(decode_fixed(FixedKind::Color, &encoded).unwrap(), color);

        let tone = FixedValue::Tone(Rgba { r: -68.0, g: -68.0, b: 0.0, a: 68.0 });
        assert_eq!(decode_fixed(FixedKind::Tone, &encode_fixed(&tone)).unwrap(), tone);

        let rect = FixedValue::Rect(Rect { x: -4, y: 8, width: 640, height: 480 });
        assert_eq!(decode_fixed(FixedKind::Rect, &encode_fixed(&rect)).unwrap(), rect);
    }

    #[test]
    fn test_wrong_size_color() {
        assert!(decode_fixed(FixedKind::Color, &[0u8; 31]).is_err());
        assert!(decode_fixed(FixedKind::Rect, &[0u8; 17]).is_err());
    }
}
