//! Error and diagnostic types for schema loading, resolution, and codec operations.
//!
//! Mirrors the hand-written `Display`/`Error` style used throughout this codebase
//! rather than a derive-macro crate: each error is a plain enum with a `fmt::Display`
//! impl that renders a human-readable message, and an empty `std::error::Error` impl.

use core::fmt;

/// A non-fatal issue surfaced during schema loading or decoding.
///
/// Diagnostics never abort the operation that produced them; callers may inspect
/// the returned list, log it, or ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Diagnostic { file: file.into(), line, message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.message)
    }
}

/// Fatal errors raised while resolving an identifier to a concrete schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Identifier was not a schema object, a string name, or an integer code.
    UnsupportedIdentifier,
    /// A numeric code had no matching name in the opcode map.
    UnknownOpcode(i64),
    /// No schema registered for `(name, version)`.
    NoSchema { name: String, version: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnsupportedIdentifier => {
                write!(f, "identifier must be a schema, a name, or an opcode")
            }
            ResolveError::UnknownOpcode(code) => write!(f, "unknown opcode {code}"),
            ResolveError::NoSchema { name, version } => {
                write!(f, "no schema registered for {name} version {version}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Fatal error from the length estimator: an augmented schema referenced a type
/// name the estimator does not recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthError {
    pub path: String,
    pub type_name: String,
}

impl fmt::Display for LengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: unknown type '{}'", self.path, self.type_name)
    }
}

impl std::error::Error for LengthError {}

/// Fatal errors raised while encoding a record into a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    Length(LengthError),
    Resolve(ResolveError),
    /// A value at `path` could not be written as `type_name`.
    InvalidValue { path: String, type_name: String, detail: String },
    /// The schema resolved without an opcode and one is required at the top level.
    MissingOpcode { name: String },
    /// The length estimator and the actual encoded size disagree; always a bug.
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Length(e) => write!(f, "{e}"),
            EncodeError::Resolve(e) => write!(f, "{e}"),
            EncodeError::InvalidValue { path, type_name, detail } => {
                write!(f, "{path}: cannot write '{type_name}': {detail}")
            }
            EncodeError::MissingOpcode { name } => {
                write!(f, "no opcode mapped for message '{name}'")
            }
            EncodeError::LengthMismatch { expected, actual } => write!(
                f,
                "encoded length {actual} does not match estimated length {expected}"
            ),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<LengthError> for EncodeError {
    fn from(e: LengthError) -> Self {
        EncodeError::Length(e)
    }
}

impl From<ResolveError> for EncodeError {
    fn from(e: ResolveError) -> Self {
        EncodeError::Resolve(e)
    }
}

/// Fatal errors raised while decoding a frame into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Resolve(ResolveError),
    /// Ran past the end of the buffer while reading `needed` bytes at `path`.
    UnexpectedEof { path: String, needed: usize, at: usize },
    /// An array element's self-pointer did not match the position it was read from.
    HerePointerMismatch { path: String, expected: u16, found: u16 },
    UnknownType { path: String, type_name: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Resolve(e) => write!(f, "{e}"),
            DecodeError::UnexpectedEof { path, needed, at } => write!(
                f,
                "{path}: unexpected end of buffer (needed {needed} bytes at offset {at})"
            ),
            DecodeError::HerePointerMismatch { path, expected, found } => write!(
                f,
                "{path}: array element self-pointer mismatch (expected {expected}, found {found})"
            ),
            DecodeError::UnknownType { path, type_name } => {
                write!(f, "{path}: unknown type '{type_name}'")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<ResolveError> for DecodeError {
    fn from(e: ResolveError) -> Self {
        DecodeError::Resolve(e)
    }
}

/// Fatal error from the filesystem-facing loader convenience layer.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    /// `path` did not match the definition filename grammar `<Name>.<Version>.def`.
    BadDefinitionFilename { path: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "io error: {e}"),
            LoadError::BadDefinitionFilename { path } => {
                write!(f, "'{path}' does not match <Name>.<Version>.def")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::BadDefinitionFilename { .. } => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}
