//! Zlib blobs embedded in `Scripts` data files
//!
//! Each script entry is `[id, name, zlib(source)]`. Sources are inflated,
//! decoded to text for scanning and deflated again at the best compression
//! level after rewriting. Exact compressed bytes are not reproduced, only the
//! inflated content.

use std::io::{Read, Write};

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{Error, Result};

/// Encodings tried, in order, when turning script bytes into text.
pub fn script_encodings() -> [&'static Encoding; 2] {
    [UTF_8, WINDOWS_1252]
}

/// Inflate a zlib stream
///
/// # Errors
/// Returns [`Error::ZlibDecompressionFailed`] for corrupt input.
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::with_capacity(compressed.len() * 4);

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::ZlibDecompressionFailed {
            message: e.to_string(),
        })?;

    Ok(decompressed)
}

/// Deflate data at the best compression level
///
/// # Errors
/// Returns an error if the encoder fails.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| Error::CompressionError(format!("Zlib: {e}")))?;
    encoder
        .finish()
        .map_err(|e| Error::CompressionError(format!("Zlib: {e}")))
}

/// Decoded script source and the encoding it was read with.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptText {
    pub text: String,
    pub encoding: &'static Encoding,
    /// True when no candidate decoded cleanly and replacement characters were used.
    pub lossy: bool,
}

/// Decode bytes with the first candidate encoding that accepts them
///
/// # Errors
/// Returns [`Error::EncodingConversionFailure`] when every candidate rejects
/// the input.
pub fn decode_text(
    bytes: &[u8],
    candidates: &[&'static Encoding],
) -> Result<(String, &'static Encoding)> {
    for encoding in candidates {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return Ok((text.into_owned(), *encoding));
        }
    }

    Err(Error::EncodingConversionFailure {
        candidates: candidates
            .iter()
            .map(|encoding| encoding.name())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Decode script source bytes, never failing
///
/// Tries [`script_encodings`] in order. If none accepts the bytes the failure
/// is logged and the source is decoded as UTF-8 with replacement characters.
pub fn decode_script_text(bytes: &[u8]) -> ScriptText {
    decode_script_text_with(bytes, &script_encodings())
}

/// [`decode_script_text`] with an explicit candidate list.
pub fn decode_script_text_with(bytes: &[u8], candidates: &[&'static Encoding]) -> ScriptText {
    match decode_text(bytes, candidates) {
        Ok((text, encoding)) => ScriptText {
            text,
            encoding,
            lossy: false,
        },
        Err(err) => {
            tracing::warn!("{err}; falling back to lossy UTF-8");
            ScriptText {
                text: String::from_utf8_lossy(bytes).into_owned(),
                encoding: UTF_8,
                lossy: true,
            }
        }
    }
}

/// Inflate a script blob and decode it to text.
///
/// # Errors
/// Returns an error only if the zlib stream itself is corrupt.
pub fn inflate_script(compressed: &[u8]) -> Result<ScriptText> {
    let bytes = inflate(compressed)?;
    Ok(decode_script_text(&bytes))
}

/// Deflate rewritten script source. Output is always UTF-8.
///
/// # Errors
/// Returns an error if the encoder fails.
pub fn deflate_script(text: &str) -> Result<Vec<u8>> {
    deflate(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::SHIFT_JIS;

    #[test]
    fn test_inflate_deflate() {
        let source = "print \"Hello\"\r\nx = 'world'\r\n".repeat(20);
        let compressed = deflate_script(&source).unwrap();
        assert!(compressed.len() < source.len());
        let script = inflate_script(&compressed).unwrap();
        assert_eq!(script.text, source);
        assert_eq!(script.encoding, UTF_8);
        assert!(!script.lossy);
    }

    #[test]
    fn test_corrupt_stream() {
        let err = inflate(b"definitely not zlib").unwrap_err();
        assert!(matches!(err, Error::ZlibDecompressionFailed { .. }));
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "90°" with a Windows-1252 degree sign
        let script = decode_script_text(b"90\xb0");
        assert_eq!(script.text, "90°");
        assert_eq!(script.encoding, WINDOWS_1252);
    }

    #[test]
    fn test_no_candidate_falls_back_to_lossy() {
        // A lone lead byte is invalid in both UTF-8 and Shift_JIS
        let bytes = b"abc\x82";
        assert!(matches!(
            decode_text(bytes, &[UTF_8, SHIFT_JIS]),
            Err(Error::EncodingConversionFailure { .. })
        ));
        let script = decode_script_text_with(bytes, &[UTF_8, SHIFT_JIS]);
        assert!(script.lossy);
        assert!(script.text.starts_with("abc"));
    }
}
