//! Error types for `RgssText`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `RgssText` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Marshal Stream Errors ====================
    /// The stream does not start with a supported marshal version header.
    #[error("unsupported marshal version {major}.{minor} (expected 4.8)")]
    InvalidMarshalVersion {
        /// Major version byte found in the stream.
        major: u8,
        /// Minor version byte found in the stream.
        minor: u8,
    },

    /// A type tag outside the supported set was found.
    #[error("unsupported type tag {tag:#04x} ({}) at offset {offset}", *tag as char)]
    UnsupportedTag {
        /// The raw tag byte.
        tag: u8,
        /// Byte offset of the tag within the stream.
        offset: usize,
    },

    /// The stream ended before a value was fully read.
    #[error("truncated stream: ran out of bytes at offset {offset}")]
    TruncatedStream {
        /// Byte offset at which more data was required.
        offset: usize,
    },

    /// A symbol backreference points past the symbol table.
    #[error("invalid symbol link: {0}")]
    InvalidSymbolLink(usize),

    /// An object backreference points past the object table.
    #[error("invalid object link: {0}")]
    InvalidObjectLink(usize),

    // ==================== Fixed Binary Value Errors ====================
    /// A Table/Color/Tone/Rect payload failed its size or consistency check.
    #[error("malformed {kind} payload: {message}")]
    MalformedFixedValue {
        /// The fixed type name (`Table`, `Color`, ...).
        kind: &'static str,
        /// Description of what is inconsistent.
        message: String,
    },

    // ==================== Graph Access Errors ====================
    /// A record does not carry the requested instance variable.
    #[error("field '{field}' not found on {class}")]
    FieldNotFound {
        /// Class name of the record.
        class: String,
        /// Requested field name (without the `@` prefix).
        field: String,
    },

    /// A value path does not resolve inside the graph.
    #[error("invalid value path: {0}")]
    InvalidPath(String),

    // ==================== Script Blob Errors ====================
    /// Zlib decompression failed.
    #[error("Zlib decompression failed: {message}")]
    ZlibDecompressionFailed {
        /// The error message.
        message: String,
    },

    /// Generic compression error.
    #[error("compression failed: {0}")]
    CompressionError(String),

    /// Script bytes are not valid text in any candidate encoding.
    #[error("script text is not decodable as any of: {candidates}")]
    EncodingConversionFailure {
        /// Comma separated candidate encoding names.
        candidates: String,
    },

    // ==================== Project Errors ====================
    /// Inject was requested but a translation table is missing.
    #[error("missing translation file: {path}")]
    MissingTranslationFile {
        /// The expected `_trans.txt` path.
        path: PathBuf,
    },

    /// The project or its data directory does not exist.
    #[error("project data directory not found: {path}")]
    ProjectNotFound {
        /// The directory that was expected.
        path: PathBuf,
    },

    /// No `System.rxdata`/`System.rvdata`/`System.rvdata2` was found.
    #[error("could not detect the engine: no System data file in {path}")]
    EngineNotDetected {
        /// The data directory that was searched.
        path: PathBuf,
    },

    /// The decoded file does not have the shape its category requires.
    #[error("unexpected layout in {file}: {message}")]
    UnexpectedLayout {
        /// File name.
        file: String,
        /// What was expected.
        message: String,
    },

    // ==================== Parsing Errors ====================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}

impl Error {
    /// Whether this error came from the binary codecs and means the input
    /// file itself is unusable.
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidMarshalVersion { .. }
                | Error::UnsupportedTag { .. }
                | Error::TruncatedStream { .. }
                | Error::InvalidSymbolLink(_)
                | Error::InvalidObjectLink(_)
                | Error::MalformedFixedValue { .. }
        )
    }
}

/// A specialized Result type for `RgssText` operations.
pub type Result<T> = std::result::Result<T, Error>;
