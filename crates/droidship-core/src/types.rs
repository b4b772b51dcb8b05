//! Shared types passed between the build and publish stages

use std::path::PathBuf;

use serde::Serialize;

/// Outcome of one Gradle release build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    /// Highest versionCode across every produced artifact
    pub max_version_code: u64,
    /// Produced artifacts, in manifest order
    pub artifact_paths: Vec<PathBuf>,
    /// Android applicationId
    pub package_identifier: String,
}
