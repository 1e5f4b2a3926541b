//! Error type for selector construction and selection.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by selectors.
///
/// Every variant indicates a caller-side programming error (bad configuration
/// or malformed input). Selection never fails once its inputs are valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Empty candidate set, no populated group, non-finite score, or an
    /// out-of-range configuration parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
