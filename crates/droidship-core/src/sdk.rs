//! Android SDK discovery

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::SdkError;

/// Environment variable naming the SDK root
pub const ANDROID_HOME: &str = "ANDROID_HOME";

/// Gradle's per-checkout properties file
pub const LOCAL_PROPERTIES: &str = "local.properties";

/// A located Android SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidSdk {
    root: PathBuf,
}

impl AndroidSdk {
    /// Locate the SDK from `ANDROID_HOME`, then `<project_root>/local.properties`
    pub fn locate(project_root: &Path) -> Result<Self, SdkError> {
        Self::locate_with(std::env::var_os(ANDROID_HOME), project_root)
    }

    /// Locate the SDK with an explicit `ANDROID_HOME` value
    pub fn locate_with(android_home: Option<OsString>, project_root: &Path) -> Result<Self, SdkError> {
        let root = resolve_sdk_dir(android_home, project_root)?;
        info!(sdk = %root.display(), "using Android SDK");
        Ok(Self { root })
    }

    /// Wrap an already known SDK directory
    pub fn from_path(root: impl Into<PathBuf>) -> Result<Self, SdkError> {
        let root = root.into();
        if root.is_dir() {
            Ok(Self { root })
        } else {
            Err(SdkError::NotFound {
                candidate: Some(root),
            })
        }
    }

    /// SDK root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Resolve the SDK directory.
///
/// A non-empty `env_value` always wins and `local.properties` is not read,
/// even if the variable points somewhere invalid.
pub fn resolve_sdk_dir(env_value: Option<OsString>, project_root: &Path) -> Result<PathBuf, SdkError> {
    let candidate = match env_value.filter(|v| !v.is_empty()) {
        Some(value) => {
            debug!(source = ANDROID_HOME, "SDK location from environment");
            Some(PathBuf::from(value))
        }
        None => {
            let properties = project_root.join(LOCAL_PROPERTIES);
            debug!(path = %properties.display(), "SDK location from local.properties");
            std::fs::read_to_string(&properties)
                .ok()
                .and_then(|content| parse_sdk_dir(&content))
        }
    };

    match candidate {
        Some(dir) if dir.is_dir() => Ok(dir),
        other => Err(SdkError::NotFound { candidate: other }),
    }
}

/// Extract the first `sdk.dir` entry from Java properties text
pub fn parse_sdk_dir(content: &str) -> Option<PathBuf> {
    content.lines().find_map(|line| {
        let line = line.trim_start();
        if line.starts_with('#') || line.starts_with('!') {
            return None;
        }
        let rest = line.strip_prefix("sdk.dir")?;
        let rest = rest.trim_start();
        let value = rest
            .strip_prefix('=')
            .or_else(|| rest.strip_prefix(':'))?
            .trim();
        if value.is_empty() {
            None
        } else {
            Some(PathBuf::from(unescape_property(value)))
        }
    })
}

/// Undo Java properties escaping (`C\:\\Android` becomes `C:\Android`)
fn unescape_property(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('t') => out.push('\t'),
                Some(next) => out.push(next),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_wins_and_properties_not_consulted() {
        let sdk = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        // Unreadable as properties: a directory in place of the file
        std::fs::create_dir(project.path().join(LOCAL_PROPERTIES)).unwrap();

        let resolved =
            resolve_sdk_dir(Some(sdk.path().as_os_str().to_owned()), project.path()).unwrap();
        assert_eq!(resolved, sdk.path());
    }

    #[test]
    fn test_env_pointing_nowhere_does_not_fall_back() {
        let sdk = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(
            project.path().join(LOCAL_PROPERTIES),
            format!("sdk.dir={}\n", sdk.path().display()),
        )
        .unwrap();

        let err = resolve_sdk_dir(Some(OsString::from("/nonexistent/sdk")), project.path())
            .unwrap_err();
        assert!(matches!(err, SdkError::NotFound { candidate: Some(ref p) } if p == Path::new("/nonexistent/sdk")));
    }

    #[test]
    fn test_falls_back_to_local_properties() {
        let sdk = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(
            project.path().join(LOCAL_PROPERTIES),
            format!("# generated\nndk.dir=/opt/ndk\nsdk.dir={}\n", sdk.path().display()),
        )
        .unwrap();

        let resolved = resolve_sdk_dir(None, project.path()).unwrap();
        assert_eq!(resolved, sdk.path());
    }

    #[test]
    fn test_empty_env_treated_as_unset() {
        let sdk = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(
            project.path().join(LOCAL_PROPERTIES),
            format!("sdk.dir={}\n", sdk.path().display()),
        )
        .unwrap();

        let resolved = resolve_sdk_dir(Some(OsString::new()), project.path()).unwrap();
        assert_eq!(resolved, sdk.path());
    }

    #[test]
    fn test_nothing_resolves() {
        let project = TempDir::new().unwrap();
        let err = resolve_sdk_dir(None, project.path()).unwrap_err();
        assert!(matches!(err, SdkError::NotFound { candidate: None }));
    }

    #[test]
    fn test_properties_pointing_to_missing_dir() {
        let project = TempDir::new().unwrap();
        std::fs::write(project.path().join(LOCAL_PROPERTIES), "sdk.dir=/opt/sdk-missing\n").unwrap();

        let err = resolve_sdk_dir(None, project.path()).unwrap_err();
        assert!(matches!(err, SdkError::NotFound { candidate: Some(_) }));
    }

    #[test]
    fn test_parse_sdk_dir() {
        assert_eq!(parse_sdk_dir("sdk.dir=/opt/sdk\n"), Some(PathBuf::from("/opt/sdk")));
        assert_eq!(parse_sdk_dir("sdk.dir = /opt/sdk"), Some(PathBuf::from("/opt/sdk")));
        assert_eq!(
            parse_sdk_dir("sdk.dir=C\\:\\\\Users\\\\me\\\\Android"),
            Some(PathBuf::from("C:\\Users\\me\\Android"))
        );
        assert_eq!(parse_sdk_dir("#sdk.dir=/opt/sdk\n"), None);
        assert_eq!(parse_sdk_dir("sdk.dirs=/opt/sdk\n"), None);
        assert_eq!(parse_sdk_dir("sdk.dir=\n"), None);
    }

    #[test]
    fn test_locate_with_explicit_home() {
        let sdk = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        let located =
            AndroidSdk::locate_with(Some(sdk.path().as_os_str().to_owned()), project.path()).unwrap();
        assert_eq!(located.root(), sdk.path());
        assert!(AndroidSdk::locate_with(None, project.path()).is_err());
    }

    #[test]
    fn test_from_path() {
        let sdk = TempDir::new().unwrap();
        assert_eq!(AndroidSdk::from_path(sdk.path()).unwrap().root(), sdk.path());
        assert!(AndroidSdk::from_path("/nonexistent/sdk").is_err());
    }
}
