//! F-Droid package metadata

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{PublishError, Result};

fn version_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^CurrentVersionCode: [^\r\n]+").expect("valid CurrentVersionCode regex")
    })
}

/// Replace every `CurrentVersionCode: <value>` line, leaving all other bytes
/// untouched. Returns `None` when no such line exists.
pub fn update_current_version_code(contents: &str, version_code: u64) -> Option<String> {
    let re = version_code_regex();
    if !re.is_match(contents) {
        return None;
    }
    let replacement = format!("CurrentVersionCode: {}", version_code);
    Some(re.replace_all(contents, regex::NoExpand(&replacement)).into_owned())
}

/// `metadata/<package>.yml` inside a repository workspace
#[derive(Debug, Clone)]
pub struct MetadataFile {
    path: PathBuf,
}

impl MetadataFile {
    /// Locate the metadata file for `package` in `workspace`
    pub fn locate(workspace: &Path, package: &str) -> Result<Self> {
        let path = workspace.join("metadata").join(format!("{}.yml", package));
        if !path.is_file() {
            return Err(PublishError::MetadataNotFound(path));
        }
        Ok(Self { path })
    }

    /// Path of the metadata file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the file with a new CurrentVersionCode
    pub fn set_current_version_code(&self, version_code: u64) -> Result<()> {
        let io_err = |source| PublishError::MetadataIo {
            path: self.path.clone(),
            source,
        };

        let contents = std::fs::read_to_string(&self.path).map_err(io_err)?;
        let updated = update_current_version_code(&contents, version_code)
            .ok_or_else(|| PublishError::VersionMarkerMissing(self.path.clone()))?;

        if updated == contents {
            debug!(path = %self.path.display(), "CurrentVersionCode already up to date");
        }
        std::fs::write(&self.path, updated).map_err(io_err)?;

        info!(path = %self.path.display(), version_code, "updated CurrentVersionCode");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_substitution_preserves_other_lines() {
        let updated =
            update_current_version_code("CurrentVersionCode: 12\nOther: unchanged\n", 15).unwrap();
        assert_eq!(updated, "CurrentVersionCode: 15\nOther: unchanged\n");
    }

    #[test]
    fn test_marker_in_middle_of_file() {
        let contents = "Categories:\n  - Internet\nCurrentVersion: 1.2.0\nCurrentVersionCode: 100\nAutoUpdateMode: None\n";
        let updated = update_current_version_code(contents, 101).unwrap();
        assert_eq!(
            updated,
            "Categories:\n  - Internet\nCurrentVersion: 1.2.0\nCurrentVersionCode: 101\nAutoUpdateMode: None\n"
        );
    }

    #[test]
    fn test_crlf_line_endings_preserved() {
        let updated =
            update_current_version_code("License: GPL-3.0\r\nCurrentVersionCode: 3\r\n", 4).unwrap();
        assert_eq!(updated, "License: GPL-3.0\r\nCurrentVersionCode: 4\r\n");
    }

    #[test]
    fn test_similar_keys_untouched() {
        let contents = "  CurrentVersionCode: 1\nCurrentVersionCodeX: 2\nCurrentVersionCode: 3";
        let updated = update_current_version_code(contents, 9).unwrap();
        assert_eq!(
            updated,
            "  CurrentVersionCode: 1\nCurrentVersionCodeX: 2\nCurrentVersionCode: 9"
        );
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(update_current_version_code("CurrentVersion: 1.0\n", 2), None);
    }

    #[test]
    fn test_metadata_file_roundtrip() {
        let workspace = TempDir::new().unwrap();
        std::fs::create_dir(workspace.path().join("metadata")).unwrap();
        let path = workspace.path().join("metadata/com.example.app.yml");
        std::fs::write(&path, "CurrentVersionCode: 12\nOther: unchanged\n").unwrap();

        let file = MetadataFile::locate(workspace.path(), "com.example.app").unwrap();
        file.set_current_version_code(15).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "CurrentVersionCode: 15\nOther: unchanged\n"
        );
    }

    #[test]
    fn test_metadata_not_found() {
        let workspace = TempDir::new().unwrap();
        let err = MetadataFile::locate(workspace.path(), "com.example.app").unwrap_err();
        assert!(matches!(err, PublishError::MetadataNotFound(ref p) if p.ends_with("metadata/com.example.app.yml")));
    }

    #[test]
    fn test_missing_marker_leaves_file_alone() {
        let workspace = TempDir::new().unwrap();
        std::fs::create_dir(workspace.path().join("metadata")).unwrap();
        let path = workspace.path().join("metadata/com.example.app.yml");
        std::fs::write(&path, "Name: Example\n").unwrap();

        let file = MetadataFile::locate(workspace.path(), "com.example.app").unwrap();
        let err = file.set_current_version_code(2).unwrap_err();
        assert!(matches!(err, PublishError::VersionMarkerMissing(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Name: Example\n");
    }
}
