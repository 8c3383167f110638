//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Address does not carry the `o://` scheme.
    #[error("Invalid address: {0} (must start with o://)")]
    InvalidAddress(String),
    /// Transport endpoint text could not be parsed.
    #[error("Invalid transport endpoint: {0}")]
    InvalidEndpoint(String),
    /// Endpoint has no peer identity component.
    #[error("No peer id in endpoint: {0}")]
    MissingPeerId(String),
    /// Canonical serialization failed
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
