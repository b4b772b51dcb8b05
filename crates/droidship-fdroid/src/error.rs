//! Error types for repository publishing

use std::path::PathBuf;
use thiserror::Error;

use droidship_core::SdkError;
use droidship_signing::SigningError;

/// Result type for publish operations
pub type Result<T> = std::result::Result<T, PublishError>;

/// Repository publishing errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Artifact could not be copied into the repository
    #[error("Failed to copy {from} to {to}: {source}")]
    ArtifactCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No metadata file for the package
    #[error("Metadata file not found: {0}")]
    MetadataNotFound(PathBuf),

    /// Metadata file has no CurrentVersionCode line
    #[error("No 'CurrentVersionCode:' line in {0}")]
    VersionMarkerMissing(PathBuf),

    /// Metadata file could not be read or written
    #[error("Failed to update metadata {path}: {source}")]
    MetadataIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Android SDK could not be located
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// Keystore could not be materialized or removed
    #[error(transparent)]
    Keystore(#[from] SigningError),

    /// Index tool could not be started
    #[error("Failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Index tool exited with a non-zero status
    #[error("Index tool failed: {command} ({})", describe_exit(.exit_code))]
    IndexToolFailed {
        command: String,
        exit_code: Option<i32>,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl PublishError {
    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Sdk(e) => e.exit_code(),
            Self::Keystore(_) => 2,
            Self::Spawn { .. } | Self::IndexToolFailed { .. } => 13,
            Self::ArtifactCopy { .. }
            | Self::MetadataNotFound(_)
            | Self::VersionMarkerMissing(_)
            | Self::MetadataIo { .. } => 12,
        }
    }
}
