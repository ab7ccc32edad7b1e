//! Error types for the CoreKV memtable and filter primitives.

use thiserror::Error;

/// The result type used throughout CoreKV.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for CoreKV operations.
///
/// Lookups report absence through `Option`, and filters degrade instead of
/// failing, so the variants here are limited to configuration mistakes and
/// structural limits of the index.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The index cannot address any more nodes.
    #[error("Capacity exceeded: {0}")]
    Capacity(String),
}

impl Error {
    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new capacity error.
    pub fn capacity(msg: impl Into<String>) -> Self {
        Error::Capacity(msg.into())
    }
}
