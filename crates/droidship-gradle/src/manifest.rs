//! Gradle `output-metadata.json` parsing

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use droidship_core::BuildResult;

use crate::error::{BuildError, Result};

/// Manifest file written next to the APKs of a variant
pub const OUTPUT_METADATA_FILE: &str = "output-metadata.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputMetadata {
    application_id: String,
    elements: Vec<OutputElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputElement {
    output_file: String,
    version_code: u64,
}

/// Read a build manifest; artifact paths are resolved against its directory
pub fn read_build_manifest(path: &Path) -> Result<BuildResult> {
    debug!(path = %path.display(), "reading build output manifest");

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildError::ManifestNotFound(path.to_path_buf())
        } else {
            BuildError::ManifestParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    })?;

    let output_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_build_manifest(&content, output_dir).map_err(|message| BuildError::ManifestParse {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_build_manifest(content: &str, output_dir: &Path) -> std::result::Result<BuildResult, String> {
    let metadata: OutputMetadata = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let max_version_code = metadata
        .elements
        .iter()
        .map(|element| element.version_code)
        .max()
        .ok_or_else(|| "manifest lists no output elements".to_string())?;

    let artifact_paths: Vec<PathBuf> = metadata
        .elements
        .iter()
        .map(|element| output_dir.join(&element.output_file))
        .collect();

    for artifact in &artifact_paths {
        info!(artifact = %artifact.display(), "build produced artifact");
    }
    info!(max_version_code, package = %metadata.application_id, "max version code");

    Ok(BuildResult {
        max_version_code,
        artifact_paths,
        package_identifier: metadata.application_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "version": 3,
  "artifactType": { "type": "APK", "kind": "Directory" },
  "applicationId": "com.example.app",
  "variantName": "playRelease",
  "elements": [
    { "type": "ONE_OF_MANY", "filters": [{ "filterType": "ABI", "value": "arm64-v8a" }],
      "versionCode": 7, "versionName": "1.0", "outputFile": "app-play-arm64-v8a-release.apk" },
    { "type": "ONE_OF_MANY", "filters": [{ "filterType": "ABI", "value": "x86_64" }],
      "versionCode": 9, "versionName": "1.0", "outputFile": "app-play-x86_64-release.apk" },
    { "type": "UNIVERSAL", "filters": [],
      "versionCode": 8, "versionName": "1.0", "outputFile": "app-play-universal-release.apk" }
  ]
}"#;

    #[test]
    fn test_max_version_code_and_paths() {
        let result = parse_build_manifest(MANIFEST, Path::new("/out")).unwrap();
        assert_eq!(result.max_version_code, 9);
        assert_eq!(result.package_identifier, "com.example.app");
        assert_eq!(
            result.artifact_paths,
            vec![
                PathBuf::from("/out/app-play-arm64-v8a-release.apk"),
                PathBuf::from("/out/app-play-x86_64-release.apk"),
                PathBuf::from("/out/app-play-universal-release.apk"),
            ]
        );
    }

    #[test]
    fn test_max_is_taken_over_every_element() {
        for codes in [vec![3u64], vec![5, 5, 5], vec![12, 4, 30, 29], vec![1, 2]] {
            let elements: Vec<String> = codes
                .iter()
                .enumerate()
                .map(|(i, code)| format!(r#"{{"outputFile": "a{}.apk", "versionCode": {}}}"#, i, code))
                .collect();
            let content = format!(
                r#"{{"applicationId": "com.example.app", "elements": [{}]}}"#,
                elements.join(",")
            );

            let result = parse_build_manifest(&content, Path::new("out")).unwrap();
            assert_eq!(result.max_version_code, *codes.iter().max().unwrap());
            assert_eq!(result.artifact_paths.len(), codes.len());
        }
    }

    #[test]
    fn test_missing_application_id() {
        let err = parse_build_manifest(
            r#"{"elements": [{"outputFile": "a.apk", "versionCode": 1}]}"#,
            Path::new("out"),
        )
        .unwrap_err();
        assert!(err.contains("applicationId"));
    }

    #[test]
    fn test_missing_version_code() {
        let err = parse_build_manifest(
            r#"{"applicationId": "x", "elements": [{"outputFile": "a.apk"}]}"#,
            Path::new("out"),
        )
        .unwrap_err();
        assert!(err.contains("versionCode"));
    }

    #[test]
    fn test_empty_elements() {
        let err = parse_build_manifest(r#"{"applicationId": "x", "elements": []}"#, Path::new("out"))
            .unwrap_err();
        assert!(err.contains("no output elements"));
    }

    #[test]
    fn test_read_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = read_build_manifest(&temp.path().join(OUTPUT_METADATA_FILE)).unwrap_err();
        assert!(matches!(err, BuildError::ManifestNotFound(_)));
    }

    #[test]
    fn test_read_malformed_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(OUTPUT_METADATA_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_build_manifest(&path).unwrap_err();
        assert!(matches!(err, BuildError::ManifestParse { .. }));
    }

    #[test]
    fn test_read_resolves_against_manifest_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(OUTPUT_METADATA_FILE);
        std::fs::write(&path, MANIFEST).unwrap();

        let result = read_build_manifest(&path).unwrap();
        assert_eq!(
            result.artifact_paths[0],
            temp.path().join("app-play-arm64-v8a-release.apk")
        );
    }
}
