use thiserror::Error;

/// Result alias for `commune`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the community detection entry points.
///
/// Graph queries never fail; only structural misuse surfaces here.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The graph has no nodes.
    #[error("empty input provided")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl Error {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, message: &'static str) -> Self {
        Self::InvalidParameter { name, message }
    }
}
