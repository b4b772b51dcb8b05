//! Error types for signing operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Signing-related errors
#[derive(Debug, Error)]
pub enum SigningError {
    /// Keystore text is not valid base64
    #[error("Keystore is not valid base64: {0}")]
    InvalidKeystore(#[from] base64::DecodeError),

    /// Keystore decoded to nothing
    #[error("Keystore is empty")]
    EmptyKeystore,

    /// Could not create or write the keystore file
    #[error("Failed to write keystore in {dir}: {source}")]
    WriteFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not remove the keystore file
    #[error("Failed to remove keystore {path}: {source}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
