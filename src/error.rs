//! Crate-wide error type and `Result` alias.

use std::fmt;

/// The error type returned by every fallible operation in this crate.
#[derive(Debug)]
pub enum Error {
    /// The file violates the Parquet format: bad magic, truncated page, invalid
    /// varint, inconsistent level/value lengths.
    MalformedFile(String),
    /// A (physical type, encoding) pair, or a codec, that this crate does not
    /// implement.
    Unsupported(String),
    /// Two files read together disagree on the physical type (or presence) of a
    /// projected column.
    SchemaIncompatible {
        column: String,
        path: String,
        reason: String,
    },
    /// A column chunk's uncompressed size exceeds the configured array-length limit.
    SizeLimitExceeded { limit: usize, requested: usize },
    /// A projection named a column that does not exist in the file's schema.
    UnknownColumn(String),
    /// The caller misused the row-oriented API: wrong physical type, column not
    /// projected, or a null value read through a non-null accessor.
    ConsumerMisuse(String),
    /// An underlying I/O or memory-mapping failure.
    Io(std::io::Error),
}

impl Error {
    pub(crate) fn oos<T: Into<String>>(msg: T) -> Self {
        Error::MalformedFile(msg.into())
    }

    pub(crate) fn unsupported<T: Into<String>>(msg: T) -> Self {
        Error::Unsupported(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedFile(msg) => write!(f, "malformed parquet file: {msg}"),
            Error::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Error::SchemaIncompatible {
                column,
                path,
                reason,
            } => write!(
                f,
                "schema incompatible for column {column:?} at {path:?}: {reason}"
            ),
            Error::SizeLimitExceeded { limit, requested } => write!(
                f,
                "column chunk of {requested} bytes exceeds the {limit} byte limit"
            ),
            Error::UnknownColumn(name) => write!(f, "unknown column: {name:?}"),
            Error::ConsumerMisuse(msg) => write!(f, "consumer misuse: {msg}"),
            Error::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<parquet_format_safe::thrift::Error> for Error {
    fn from(e: parquet_format_safe::thrift::Error) -> Self {
        Error::MalformedFile(format!("thrift decode error: {e}"))
    }
}

/// A specialized [`Result`](std::result::Result) for this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for constructing [`Error::MalformedFile`] with a `format!`-style message.
macro_rules! oos {
    ($fmt:expr) => (crate::error::Error::MalformedFile($fmt.to_string()));
    ($fmt:expr, $($args:expr),*) => (crate::error::Error::MalformedFile(format!($fmt, $($args),*)));
}

/// Shorthand for constructing [`Error::Unsupported`] with a `format!`-style message.
macro_rules! unsupported {
    ($fmt:expr) => (crate::error::Error::Unsupported($fmt.to_string()));
    ($fmt:expr, $($args:expr),*) => (crate::error::Error::Unsupported(format!($fmt, $($args),*)));
}

pub(crate) use oos;
pub(crate) use unsupported;
