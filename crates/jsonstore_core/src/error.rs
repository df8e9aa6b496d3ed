//! Error contract shared by every store operation.
//!
//! # Responsibility
//! - Classify failures into argument, lookup, encoding and I/O buckets.
//! - Keep the failing path attached to filesystem errors.
//!
//! # Invariants
//! - `InvalidArgument` is always produced before any filesystem access.
//! - Errors are returned to the caller; nothing is retried internally.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure returned by driver operations.
#[derive(Debug)]
pub enum StoreError {
    /// Empty or unsafe collection/resource name.
    InvalidArgument(String),
    /// Neither the resource file nor the collection directory exists.
    NotFound(PathBuf),
    /// Value could not be serialized, or stored bytes are not valid JSON.
    Encoding(serde_json::Error),
    Io { path: PathBuf, source: io::Error },
}

impl StoreError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Stable short code used in structured log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::Encoding(_) => "encoding_error",
            Self::Io { .. } => "io_error",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::NotFound(path) => write!(f, "unable to find file or directory `{}`", path.display()),
            Self::Encoding(err) => write!(f, "json encoding error: {err}"),
            Self::Io { path, source } => write!(f, "i/o error at `{}`: {source}", path.display()),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(_) | Self::NotFound(_) => None,
            Self::Encoding(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encoding(value)
    }
}
