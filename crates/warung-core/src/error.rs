//! Error types for warung-core

use thiserror::Error;

/// Result type alias using warung-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warung-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed single-field input; the stored value is left untouched
    #[error("Validation error: {0}")]
    Validation(String),

    /// Structurally wrong bulk input (not an array, unparseable document)
    #[error("Format error: {0}")]
    Format(String),

    /// Wrong passphrase or tampered credential envelope
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport or HTTP failure talking to the content store
    #[error("Remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// Revision mismatch on a conditional write or delete
    #[error("Revision conflict at {path}: {message}")]
    Conflict { path: String, message: String },

    /// Product or remote path not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Credential slot backend error
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

impl Error {
    /// Whether the error is an optimistic-concurrency conflict worth retrying
    /// with a freshly fetched revision.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether the error reports a missing remote path or product.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Remote {
            status: error.status().map_or(0, |status| status.as_u16()),
            message: error.to_string(),
        }
    }
}
