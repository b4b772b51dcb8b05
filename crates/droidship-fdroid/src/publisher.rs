//! Repository publishing

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use droidship_core::config::{default_index_args, DEFAULT_INDEX_COMMAND, DEFAULT_KEYSTORE_DIR};
use droidship_core::{
    AndroidSdk, BuildResult, CredentialSet, SystemRunner, ToolInvocation, ToolRunner,
};
use droidship_signing::{EphemeralKeystore, KeystoreKind};

use crate::error::{PublishError, Result};
use crate::metadata::MetadataFile;

/// Dash-separated file name segment marking the all-ABI APK
const UNIVERSAL_SEGMENT: &str = "universal";

/// Whether an artifact is the universal (all-ABI) APK, e.g. `app-universal.apk`
/// or Gradle's `app-play-universal-release.apk`
pub fn is_universal_artifact(path: &Path) -> bool {
    path.file_stem()
        .map(|stem| {
            stem.to_string_lossy()
                .split('-')
                .any(|segment| segment == UNIVERSAL_SEGMENT)
        })
        .unwrap_or(false)
}

/// What a publish run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Destination paths of the copied artifacts
    pub copied: Vec<PathBuf>,
    /// Universal artifacts left out
    pub skipped: Vec<PathBuf>,
    /// Metadata file that was rewritten
    pub metadata: PathBuf,
    /// Version code written to the metadata
    pub version_code: u64,
}

enum SdkSource {
    /// `ANDROID_HOME` from the process environment, then `local.properties`
    Environment,
    /// The given `ANDROID_HOME` value, then `local.properties`
    AndroidHome(Option<OsString>),
    Known(AndroidSdk),
}

/// Publishes builds into an F-Droid repository workspace
pub struct FdroidPublisher<R = SystemRunner> {
    workspace: PathBuf,
    project_root: PathBuf,
    keystore_dir: PathBuf,
    sdk: SdkSource,
    command: String,
    args: Vec<String>,
    runner: R,
}

impl FdroidPublisher<SystemRunner> {
    /// Publisher that runs the real `fdroid` tool.
    ///
    /// `project_root` is where the SDK is discovered from and where the
    /// repository keystore is materialized (under `build/`).
    pub fn new(workspace: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self::with_runner(workspace, project_root, SystemRunner)
    }
}

impl<R: ToolRunner> FdroidPublisher<R> {
    /// Publisher using a custom tool runner
    pub fn with_runner(
        workspace: impl Into<PathBuf>,
        project_root: impl Into<PathBuf>,
        runner: R,
    ) -> Self {
        let project_root = project_root.into();
        Self {
            workspace: workspace.into(),
            keystore_dir: project_root.join(DEFAULT_KEYSTORE_DIR),
            project_root,
            sdk: SdkSource::Environment,
            command: DEFAULT_INDEX_COMMAND.to_string(),
            args: default_index_args(),
            runner,
        }
    }

    /// Materialize the repository keystore in `dir`
    pub fn with_keystore_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.keystore_dir = dir.into();
        self
    }

    /// Use an already located SDK instead of discovering one
    pub fn with_sdk(mut self, sdk: AndroidSdk) -> Self {
        self.sdk = SdkSource::Known(sdk);
        self
    }

    /// Discover the SDK from this `ANDROID_HOME` value instead of the
    /// process environment; `None` means only `local.properties` is read
    pub fn with_sdk_env(mut self, android_home: Option<OsString>) -> Self {
        self.sdk = SdkSource::AndroidHome(android_home);
        self
    }

    /// Replace the index command (default `fdroid update -v`)
    pub fn with_index_command(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.command = command.into();
        self.args = args;
        self
    }

    /// Repository workspace
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Artifact intake directory
    pub fn repo_dir(&self) -> PathBuf {
        self.workspace.join("repo")
    }

    /// Copy artifacts, bump the metadata version code and regenerate the index.
    ///
    /// There is no rollback: a failure after the copy step leaves the copied
    /// artifacts and patched metadata in place.
    #[instrument(skip_all, fields(workspace = %self.workspace.display(), package = %build.package_identifier))]
    pub fn publish_to_repository(
        &self,
        build: &BuildResult,
        credentials: &CredentialSet,
    ) -> Result<PublishReport> {
        let (copied, skipped) = self.copy_artifacts(build)?;

        let metadata = MetadataFile::locate(&self.workspace, &build.package_identifier)?;
        metadata.set_current_version_code(build.max_version_code)?;

        self.update_index(credentials)?;

        Ok(PublishReport {
            copied,
            skipped,
            metadata: metadata.path().to_path_buf(),
            version_code: build.max_version_code,
        })
    }

    fn copy_artifacts(&self, build: &BuildResult) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let repo_dir = self.repo_dir();
        let mut copied = Vec::new();
        let mut skipped = Vec::new();

        for artifact in &build.artifact_paths {
            if is_universal_artifact(artifact) {
                info!(artifact = %artifact.display(), "skipping universal apk");
                skipped.push(artifact.clone());
                continue;
            }

            let file_name = artifact.file_name().ok_or_else(|| PublishError::ArtifactCopy {
                from: artifact.clone(),
                to: repo_dir.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "artifact path has no file name",
                ),
            })?;
            let destination = repo_dir.join(file_name);

            info!(from = %artifact.display(), to = %destination.display(), "copying artifact");
            std::fs::copy(artifact, &destination).map_err(|source| PublishError::ArtifactCopy {
                from: artifact.clone(),
                to: destination.clone(),
                source,
            })?;
            copied.push(destination);
        }

        Ok((copied, skipped))
    }

    fn update_index(&self, credentials: &CredentialSet) -> Result<()> {
        let sdk = match &self.sdk {
            SdkSource::Known(sdk) => sdk.clone(),
            SdkSource::Environment => AndroidSdk::locate(&self.project_root)?,
            SdkSource::AndroidHome(home) => AndroidSdk::locate_with(home.clone(), &self.project_root)?,
        };

        let keystore = EphemeralKeystore::materialize(
            &credentials.keystore_base64(),
            &self.keystore_dir,
            "fdroid_keystore_",
            KeystoreKind::Pkcs12,
        )?;

        let invocation = ToolInvocation::new(&self.command, &self.workspace)
            .args(self.args.iter().cloned())
            .env("ANDROID_HOME", sdk.root().to_string_lossy())
            .env("FDROID_KEYSTORE_FILE", keystore.path().to_string_lossy())
            .secret_env("FDROID_KEYSTORE_PASSWORD", credentials.store_password())
            .secret_env("FDROID_KEY_PASSWORD", credentials.key_password())
            .env("FDROID_KEY_ALIAS", credentials.key_alias());

        info!(command = %invocation.display_command(), "running fdroid update");
        let outcome = self.runner.run(&invocation);
        let cleanup = keystore.close();
        if let Err(ref e) = cleanup {
            warn!(error = %e, "keystore cleanup failed");
        }

        let outcome = outcome.map_err(|source| PublishError::Spawn {
            command: invocation.display_command(),
            source,
        })?;
        if !outcome.is_success() {
            return Err(PublishError::IndexToolFailed {
                command: invocation.display_command(),
                exit_code: outcome.exit_code,
            });
        }
        cleanup?;

        info!("repository index updated");
        Ok(())
    }
}
