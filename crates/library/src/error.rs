//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use dcs_fetch::error::{Error as FetchError, ErrorKind as FetchErrorKind};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The catalog could not be reached or answered with an error.
    #[display("catalog request failed: {_0}")]
    Fetch(FetchErrorKind),
    /// The catalog answered with JSON of an unexpected shape.
    #[display("unexpected catalog response from {_0}")]
    InvalidResponse(#[error(not(source))] String),
}
impl ErrorKind {
    /// Convert a fetch error into a library error, preserving the fetch
    /// crate's `Exn` frame as a child in its own error tree.
    #[track_caller]
    pub fn fetch(err: FetchError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Fetch(inner))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(kind) => kind.is_retryable(),
            Self::InvalidResponse(_) => false,
        }
    }
}
