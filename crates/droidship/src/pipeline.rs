//! The release pipeline: provision credentials, build the store flavor,
//! publish to the F-Droid repository.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use droidship_core::{
    AndroidSdk, BuildResult, Config, ConfigError, CredentialSet, CredentialStore, SystemRunner,
    ToolRunner,
};
use droidship_fdroid::{FdroidPublisher, PublishReport};
use droidship_gradle::GradleBuilder;

/// Result of a full release
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    pub build: BuildResult,
    pub published: PublishReport,
}

/// Both credential sets, loaded before anything runs
pub struct ReleaseCredentials {
    pub build: CredentialSet,
    pub repository: CredentialSet,
}

/// Release pipeline over one Android project
pub struct Pipeline<R = SystemRunner> {
    project_root: PathBuf,
    config: Config,
    runner: R,
    sdk: Option<AndroidSdk>,
}

impl Pipeline<SystemRunner> {
    /// Pipeline that runs the real tools
    pub fn new(project_root: impl Into<PathBuf>, config: Config) -> Self {
        Self::with_runner(project_root, config, SystemRunner)
    }
}

impl<R: ToolRunner> Pipeline<R> {
    /// Pipeline using a custom tool runner
    pub fn with_runner(project_root: impl Into<PathBuf>, config: Config, runner: R) -> Self {
        Self {
            project_root: project_root.into(),
            config,
            runner,
            sdk: None,
        }
    }

    /// Use a known SDK instead of discovering one at publish time
    #[cfg(test)]
    pub fn with_sdk(mut self, sdk: AndroidSdk) -> Self {
        self.sdk = Some(sdk);
        self
    }

    /// Effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Project root
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Credentials file location
    pub fn credentials_path(&self) -> PathBuf {
        self.project_root.join(&self.config.project.credentials_file)
    }

    /// F-Droid workspace, if configured
    pub fn workspace(&self) -> Option<PathBuf> {
        self.config
            .fdroid
            .workspace
            .as_ref()
            .map(|w| self.project_root.join(w))
    }

    /// Load the credentials file
    pub fn credential_store(&self) -> anyhow::Result<CredentialStore> {
        let path = self.credentials_path();
        CredentialStore::load(&path)
            .with_context(|| format!("loading signing credentials from {}", path.display()))
    }

    /// Resolve both trust domains
    pub fn load_credentials(&self) -> anyhow::Result<ReleaseCredentials> {
        let store = self.credential_store()?;
        Ok(ReleaseCredentials {
            build: store.credentials(&self.config.build.credentials)?,
            repository: store.credentials(&self.config.fdroid.credentials)?,
        })
    }

    /// Gradle builder configured for this project
    pub fn builder(&self) -> GradleBuilder<&R> {
        GradleBuilder::with_runner(&self.project_root, &self.runner)
            .with_module(&self.config.project.module)
            .with_credential_transport(self.config.build.credential_transport)
    }

    /// Publisher for the configured workspace
    pub fn publisher(&self) -> anyhow::Result<FdroidPublisher<&R>> {
        let workspace = self
            .workspace()
            .ok_or_else(|| ConfigError::MissingField("fdroid.workspace".to_string()))?;

        let mut publisher = FdroidPublisher::with_runner(workspace, &self.project_root, &self.runner)
            .with_keystore_dir(self.project_root.join(&self.config.fdroid.keystore_dir))
            .with_index_command(&self.config.fdroid.command, self.config.fdroid.args.clone());
        if let Some(sdk) = &self.sdk {
            publisher = publisher.with_sdk(sdk.clone());
        }
        Ok(publisher)
    }

    /// Build the configured store flavor
    pub fn build(&self, credentials: &CredentialSet) -> anyhow::Result<BuildResult> {
        let flavor = &self.config.build.flavor;
        info!(flavor, "building release");
        self.builder()
            .build_release(flavor, &self.config.build.property_prefix, credentials)
            .with_context(|| format!("building {} release", flavor))
    }

    /// Publish a finished build
    pub fn publish(
        &self,
        build: &BuildResult,
        credentials: &CredentialSet,
    ) -> anyhow::Result<PublishReport> {
        let publisher = self.publisher()?;
        publisher
            .publish_to_repository(build, credentials)
            .with_context(|| {
                format!(
                    "publishing {} to {}",
                    build.package_identifier,
                    publisher.workspace().display()
                )
            })
    }

    /// Run the whole pipeline
    pub fn run(&self) -> anyhow::Result<ReleaseOutcome> {
        // Fail on a missing workspace before spending time on the build
        self.publisher()?;
        let credentials = self.load_credentials()?;

        let build = self.build(&credentials.build)?;
        let report = self.publish(&build, &credentials.repository)?;

        Ok(ReleaseOutcome {
            build,
            published: report,
        })
    }
}
