//! Signed Gradle release builds

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use droidship_core::config::{validate_flavor, DEFAULT_KEYSTORE_DIR, DEFAULT_MODULE};
use droidship_core::{BuildResult, CredentialSet, CredentialTransport, SystemRunner, ToolInvocation, ToolRunner};
use droidship_signing::{EphemeralKeystore, KeystoreKind};

use crate::error::{BuildError, Result};
use crate::manifest::{read_build_manifest, OUTPUT_METADATA_FILE};

/// Gradle maps `ORG_GRADLE_PROJECT_<name>` variables to project properties
const GRADLE_PROJECT_ENV_PREFIX: &str = "ORG_GRADLE_PROJECT_";

/// Builds release variants of an Android project
pub struct GradleBuilder<R = SystemRunner> {
    project_root: PathBuf,
    module: String,
    transport: CredentialTransport,
    runner: R,
}

impl GradleBuilder<SystemRunner> {
    /// Builder that runs the real Gradle
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self::with_runner(project_root, SystemRunner)
    }
}

impl<R: ToolRunner> GradleBuilder<R> {
    /// Builder using a custom tool runner
    pub fn with_runner(project_root: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            project_root: project_root.into(),
            module: DEFAULT_MODULE.to_string(),
            transport: CredentialTransport::default(),
            runner,
        }
    }

    /// Set the application module (default `app`)
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Choose how signing values reach Gradle
    pub fn with_credential_transport(mut self, transport: CredentialTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Project root
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Directory holding the APKs of a flavor's release variant
    pub fn output_dir(&self, flavor: &str) -> PathBuf {
        self.project_root
            .join(&self.module)
            .join("build/outputs/apk")
            .join(flavor)
            .join("release")
    }

    /// `output-metadata.json` of a flavor's release variant
    pub fn manifest_path(&self, flavor: &str) -> PathBuf {
        self.output_dir(flavor).join(OUTPUT_METADATA_FILE)
    }

    /// Directory ephemeral keystores are written to
    pub fn keystore_dir(&self) -> PathBuf {
        self.project_root.join(DEFAULT_KEYSTORE_DIR)
    }

    /// The Gradle wrapper if the project has one, otherwise `gradle` from PATH
    pub fn gradle_program(&self) -> PathBuf {
        let wrapper = if cfg!(windows) {
            self.project_root.join("gradlew.bat")
        } else {
            self.project_root.join("gradlew")
        };

        if wrapper.exists() {
            wrapper
        } else {
            PathBuf::from("gradle")
        }
    }

    /// Build the APKs and the app bundle of `flavor`'s release variant.
    ///
    /// The keystore exists only while Gradle runs and is removed whether or
    /// not the build succeeds.
    #[instrument(skip(self, credentials), fields(project = %self.project_root.display()))]
    pub fn build_release(
        &self,
        flavor: &str,
        credential_property_prefix: &str,
        credentials: &CredentialSet,
    ) -> Result<BuildResult> {
        validate_flavor(flavor)?;

        let keystore = EphemeralKeystore::materialize(
            &credentials.keystore_base64(),
            &self.keystore_dir(),
            "keystore_",
            KeystoreKind::Jks,
        )?;

        let invocation =
            self.invocation(flavor, credential_property_prefix, credentials, keystore.path());
        info!(command = %invocation.display_command(), "running gradle");

        let outcome = self.runner.run(&invocation);
        let cleanup = keystore.close();
        if let Err(ref e) = cleanup {
            warn!(error = %e, "keystore cleanup failed");
        }

        let outcome = outcome.map_err(|source| BuildError::Spawn {
            command: invocation.display_command(),
            source,
        })?;
        if !outcome.is_success() {
            return Err(BuildError::ToolFailed {
                command: invocation.display_command(),
                exit_code: outcome.exit_code,
            });
        }
        cleanup?;

        read_build_manifest(&self.manifest_path(flavor))
    }

    fn invocation(
        &self,
        flavor: &str,
        prefix: &str,
        credentials: &CredentialSet,
        keystore: &Path,
    ) -> ToolInvocation {
        let properties = [
            ("STORE_FILE", keystore.to_string_lossy().to_string()),
            ("STORE_PASSWORD", credentials.store_password().to_string()),
            ("KEY_ALIAS", credentials.key_alias().to_string()),
            ("KEY_PASSWORD", credentials.key_password().to_string()),
        ];

        let mut invocation = ToolInvocation::new(self.gradle_program(), &self.project_root);

        for (name, value) in properties {
            let property = format!("{}_{}", prefix, name);
            invocation = match self.transport {
                CredentialTransport::Arguments => {
                    invocation.secret_arg(format!("-P{}={}", property, value))
                }
                CredentialTransport::Environment => invocation
                    .secret_env(format!("{}{}", GRADLE_PROJECT_ENV_PREFIX, property), value),
            };
        }

        let variant = capitalize_flavor(flavor);
        invocation
            .arg(format!("assemble{}Release", variant))
            .arg(format!("bundle{}Release", variant))
            .arg("--stacktrace")
    }
}

/// Upper-case the first character, as Gradle does for variant task names
pub fn capitalize_flavor(flavor: &str) -> String {
    let mut chars = flavor.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use droidship_core::ToolOutcome;
    use tempfile::TempDir;

    const BLOB: &str = "a2V5c3RvcmUtYnl0ZXM=";

    /// Stands in for Gradle: records invocations, checks the keystore is
    /// present while it runs and optionally writes a manifest.
    struct FakeGradle {
        exit_code: i32,
        manifest: Option<(PathBuf, String)>,
        calls: RefCell<Vec<ToolInvocation>>,
        keystores_seen: RefCell<Vec<(PathBuf, bool)>>,
    }

    impl FakeGradle {
        fn new(exit_code: i32, manifest: Option<(PathBuf, String)>) -> Self {
            Self {
                exit_code,
                manifest,
                calls: RefCell::new(Vec::new()),
                keystores_seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ToolRunner for FakeGradle {
        fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutcome> {
            let keystore = invocation
                .arg_values()
                .iter()
                .find_map(|a| a.strip_prefix("-PSESSION_STORE_FILE="))
                .map(PathBuf::from)
                .or_else(|| {
                    invocation
                        .env_value("ORG_GRADLE_PROJECT_SESSION_STORE_FILE")
                        .map(PathBuf::from)
                });
            if let Some(keystore) = keystore {
                let exists = keystore.exists();
                self.keystores_seen.borrow_mut().push((keystore, exists));
            }

            if let Some((path, content)) = &self.manifest {
                std::fs::create_dir_all(path.parent().unwrap())?;
                std::fs::write(path, content)?;
            }

            self.calls.borrow_mut().push(invocation.clone());
            Ok(ToolOutcome::exited(self.exit_code))
        }
    }

    struct Unstartable;

    impl ToolRunner for Unstartable {
        fn run(&self, _invocation: &ToolInvocation) -> std::io::Result<ToolOutcome> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gradlew"))
        }
    }

    fn credentials() -> CredentialSet {
        CredentialSet::new(BLOB, "store-pass", "release", "key-pass")
    }

    fn manifest_json() -> String {
        r#"{"applicationId": "com.example.app", "elements": [
            {"outputFile": "app-arm64.apk", "versionCode": 7},
            {"outputFile": "app-x86.apk", "versionCode": 9}
        ]}"#
        .to_string()
    }

    fn manifest_location(root: &Path) -> PathBuf {
        root.join("app/build/outputs/apk/play/release/output-metadata.json")
    }

    #[test]
    fn test_build_release_success() {
        let project = TempDir::new().unwrap();
        let fake = FakeGradle::new(0, Some((manifest_location(project.path()), manifest_json())));
        let builder = GradleBuilder::with_runner(project.path(), fake);

        let result = builder.build_release("play", "SESSION", &credentials()).unwrap();

        assert_eq!(result.max_version_code, 9);
        assert_eq!(result.package_identifier, "com.example.app");
        assert_eq!(
            result.artifact_paths,
            vec![
                builder.output_dir("play").join("app-arm64.apk"),
                builder.output_dir("play").join("app-x86.apk"),
            ]
        );

        let seen = builder.runner.keystores_seen.borrow();
        assert_eq!(seen.len(), 1);
        let (keystore, existed) = &seen[0];
        assert!(*existed, "keystore must exist while gradle runs");
        assert!(keystore.starts_with(project.path().join("build")));
        assert!(keystore.extension().is_some_and(|e| e == "jks"));
        assert!(!keystore.exists(), "keystore must be removed after the build");
    }

    #[test]
    fn test_invocation_arguments() {
        let project = TempDir::new().unwrap();
        let fake = FakeGradle::new(0, Some((manifest_location(project.path()), manifest_json())));
        let builder = GradleBuilder::with_runner(project.path(), fake);

        builder.build_release("play", "SESSION", &credentials()).unwrap();

        let calls = builder.runner.calls.borrow();
        let invocation = &calls[0];
        assert_eq!(invocation.current_dir(), project.path());
        assert_eq!(invocation.program(), Path::new("gradle"));

        let args = invocation.arg_values();
        assert!(args[0].starts_with("-PSESSION_STORE_FILE="));
        assert_eq!(
            &args[1..],
            &[
                "-PSESSION_STORE_PASSWORD=store-pass",
                "-PSESSION_KEY_ALIAS=release",
                "-PSESSION_KEY_PASSWORD=key-pass",
                "assemblePlayRelease",
                "bundlePlayRelease",
                "--stacktrace",
            ]
        );
        assert!(!invocation.display_command().contains("store-pass"));
    }

    #[test]
    fn test_environment_transport() {
        let project = TempDir::new().unwrap();
        let fake = FakeGradle::new(0, Some((manifest_location(project.path()), manifest_json())));
        let builder = GradleBuilder::with_runner(project.path(), fake)
            .with_credential_transport(CredentialTransport::Environment);

        builder.build_release("play", "SESSION", &credentials()).unwrap();

        let calls = builder.runner.calls.borrow();
        let invocation = &calls[0];
        assert_eq!(
            invocation.arg_values(),
            vec!["assemblePlayRelease", "bundlePlayRelease", "--stacktrace"]
        );
        assert_eq!(
            invocation.env_value("ORG_GRADLE_PROJECT_SESSION_KEY_ALIAS"),
            Some("release")
        );
        assert_eq!(
            invocation.env_value("ORG_GRADLE_PROJECT_SESSION_STORE_PASSWORD"),
            Some("store-pass")
        );
        assert!(builder.runner.keystores_seen.borrow()[0].1);
    }

    #[test]
    fn test_tool_failure_removes_keystore() {
        let project = TempDir::new().unwrap();
        let builder = GradleBuilder::with_runner(project.path(), FakeGradle::new(1, None));

        let err = builder.build_release("play", "SESSION", &credentials()).unwrap_err();
        assert!(matches!(err, BuildError::ToolFailed { exit_code: Some(1), .. }));
        assert!(!err.to_string().contains("store-pass"));

        let seen = builder.runner.keystores_seen.borrow();
        assert!(seen[0].1);
        assert!(!seen[0].0.exists());
        assert_eq!(std::fs::read_dir(builder.keystore_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_spawn_failure_removes_keystore() {
        let project = TempDir::new().unwrap();
        let builder = GradleBuilder::with_runner(project.path(), Unstartable);

        let err = builder.build_release("play", "SESSION", &credentials()).unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
        assert_eq!(std::fs::read_dir(builder.keystore_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_manifest() {
        let project = TempDir::new().unwrap();
        let builder = GradleBuilder::with_runner(project.path(), FakeGradle::new(0, None));

        let err = builder.build_release("play", "SESSION", &credentials()).unwrap_err();
        assert!(matches!(err, BuildError::ManifestNotFound(_)));
    }

    #[test]
    fn test_invalid_keystore_never_runs_gradle() {
        let project = TempDir::new().unwrap();
        let builder = GradleBuilder::with_runner(project.path(), FakeGradle::new(0, None));
        let creds = CredentialSet::new("%%%", "a", "b", "c");

        let err = builder.build_release("play", "SESSION", &creds).unwrap_err();
        assert!(matches!(err, BuildError::Keystore(_)));
        assert!(builder.runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_invalid_flavor() {
        let project = TempDir::new().unwrap();
        let builder = GradleBuilder::with_runner(project.path(), FakeGradle::new(0, None));

        let err = builder.build_release("play store", "SESSION", &credentials()).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn test_custom_module_paths() {
        let builder = GradleBuilder::with_runner("/project", Unstartable).with_module("mobile");
        assert_eq!(
            builder.manifest_path("fdroid"),
            PathBuf::from("/project/mobile/build/outputs/apk/fdroid/release/output-metadata.json")
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_prefers_gradle_wrapper() {
        let project = TempDir::new().unwrap();
        std::fs::write(project.path().join("gradlew"), "#!/bin/sh\n").unwrap();
        let builder = GradleBuilder::with_runner(project.path(), Unstartable);
        assert_eq!(builder.gradle_program(), project.path().join("gradlew"));
    }

    #[test]
    fn test_capitalize_flavor() {
        assert_eq!(capitalize_flavor("play"), "Play");
        assert_eq!(capitalize_flavor("googlePlay"), "GooglePlay");
        assert_eq!(capitalize_flavor(""), "");
    }
}
