//! Error types for droidship core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ConfigError
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration and credential errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Credential domain missing from the credentials file
    #[error("Credentials file {path} has no [{domain}] section")]
    MissingDomain { path: PathBuf, domain: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// TOML parsing error
    #[error("Failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// IO error
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Android SDK discovery errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// Neither ANDROID_HOME nor local.properties yields an SDK directory
    #[error(
        "Android SDK not found{}. Please set ANDROID_HOME or add sdk.dir to local.properties",
        tried_suffix(.candidate)
    )]
    NotFound { candidate: Option<PathBuf> },
}

fn tried_suffix(candidate: &Option<PathBuf>) -> String {
    match candidate {
        Some(path) => format!(" (tried {})", path.display()),
        None => String::new(),
    }
}

impl SdkError {
    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        3
    }
}
