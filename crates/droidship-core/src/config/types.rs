//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

/// Main configuration for droidship
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout
    pub project: ProjectConfig,

    /// Store build configuration
    pub build: BuildConfig,

    /// F-Droid repository configuration
    pub fdroid: FdroidConfig,
}

/// Project layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Gradle application module that produces the APKs
    pub module: String,

    /// Signing credentials file, relative to the project root
    pub credentials_file: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
        }
    }
}

/// How signing values reach Gradle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialTransport {
    /// `-P<PREFIX>_...=<value>` command line arguments
    #[default]
    Arguments,
    /// `ORG_GRADLE_PROJECT_<PREFIX>_...` environment variables
    Environment,
}

/// Store build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Product flavor to build
    pub flavor: String,

    /// Prefix for the signing project properties
    pub property_prefix: String,

    /// Credential domain in the credentials file
    pub credentials: String,

    /// How signing values are handed to Gradle
    pub credential_transport: CredentialTransport,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            flavor: DEFAULT_FLAVOR.to_string(),
            property_prefix: DEFAULT_PROPERTY_PREFIX.to_string(),
            credentials: DEFAULT_BUILD_DOMAIN.to_string(),
            credential_transport: CredentialTransport::default(),
        }
    }
}

/// F-Droid repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FdroidConfig {
    /// Repository workspace (contains `repo/` and `metadata/`)
    pub workspace: Option<PathBuf>,

    /// Credential domain in the credentials file
    pub credentials: String,

    /// Where the repository keystore is materialized, relative to the project root
    pub keystore_dir: PathBuf,

    /// Index tool executable
    pub command: String,

    /// Index tool arguments
    pub args: Vec<String>,
}

impl Default for FdroidConfig {
    fn default() -> Self {
        Self {
            workspace: None,
            credentials: DEFAULT_REPOSITORY_DOMAIN.to_string(),
            keystore_dir: PathBuf::from(DEFAULT_KEYSTORE_DIR),
            command: DEFAULT_INDEX_COMMAND.to_string(),
            args: default_index_args(),
        }
    }
}
