//! Error types for Gradle builds

use std::path::PathBuf;
use thiserror::Error;

use droidship_core::ConfigError;
use droidship_signing::SigningError;

/// Result type for build operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build orchestration errors
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid build parameters
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Keystore could not be materialized or removed
    #[error(transparent)]
    Keystore(#[from] SigningError),

    /// Gradle could not be started
    #[error("Failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Gradle exited with a non-zero status
    #[error("Build tool failed: {command} ({})", describe_exit(.exit_code))]
    ToolFailed {
        command: String,
        exit_code: Option<i32>,
    },

    /// Output manifest was not produced
    #[error("Build output manifest not found at {0}")]
    ManifestNotFound(PathBuf),

    /// Output manifest is malformed or incomplete
    #[error("Invalid build output manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl BuildError {
    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(e) => e.exit_code(),
            Self::Keystore(_) => 2,
            Self::Spawn { .. } | Self::ToolFailed { .. } => 10,
            Self::ManifestNotFound(_) | Self::ManifestParse { .. } => 11,
        }
    }
}
