//! Error types for XML search operations

use std::fmt;
use std::path::PathBuf;

/// Result type for XML search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all search strategies
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input path does not exist
    #[error("XML file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path is not a regular file, or the request itself is incomplete
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The underlying parser rejected the document
    #[error("Failed to parse XML: {0}")]
    MalformedDocument(String),

    /// Export or conversion requested for a payload/format that is not handled
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading an already validated file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Copyable discriminant of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    MalformedDocument,
    UnsupportedFormat,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::InvalidInput => "invalid-input",
            ErrorKind::MalformedDocument => "malformed-document",
            ErrorKind::UnsupportedFormat => "unsupported-format",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a new malformed document error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedDocument(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(msg: S) -> Self {
        Error::UnsupportedFormat(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::MalformedDocument(_) => ErrorKind::MalformedDocument,
            Error::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}
