//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use droidship_core::config::validate_config;
use droidship_core::{load_config, load_config_or_default, Config};

use commands::{BuildCommand, CompletionsCommand, DoctorCommand, PublishCommand, ReleaseCommand};

/// droidship - Build signed Android releases and publish them to F-Droid
#[derive(Debug, Parser)]
#[command(name = "droidship")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Android project root (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (defaults to droidship.toml, searched upwards)
    #[arg(long, global = true, env = "DROIDSHIP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the store flavor and publish it to the F-Droid repository
    Release(ReleaseCommand),

    /// Build a signed release without publishing
    Build(BuildCommand),

    /// Publish an existing build to the F-Droid repository
    Publish(PublishCommand),

    /// Check configuration, credentials and tools
    Doctor(DoctorCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Settings that override droidship.toml
#[derive(Debug, Default, Args)]
pub struct PipelineOverrides {
    /// Product flavor to build
    #[arg(long)]
    pub flavor: Option<String>,

    /// Prefix for the Gradle signing properties
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub property_prefix: Option<String>,

    /// F-Droid repository workspace
    #[arg(long, env = "DROIDSHIP_FDROID_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Signing credentials file
    #[arg(long, env = "DROIDSHIP_CREDENTIALS")]
    pub credentials: Option<PathBuf>,
}

impl PipelineOverrides {
    /// Apply overrides; relative paths are taken relative to `cwd`
    pub fn apply(&self, config: &mut Config, cwd: &Path) {
        if let Some(flavor) = &self.flavor {
            config.build.flavor = flavor.clone();
        }
        if let Some(prefix) = &self.property_prefix {
            config.build.property_prefix = prefix.clone();
        }
        if let Some(workspace) = &self.workspace {
            config.fdroid.workspace = Some(cwd.join(workspace));
        }
        if let Some(credentials) = &self.credentials {
            config.project.credentials_file = cwd.join(credentials);
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Release(ref cmd) => cmd.execute(&self),
            Commands::Build(ref cmd) => cmd.execute(&self),
            Commands::Publish(ref cmd) => cmd.execute(&self),
            Commands::Doctor(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Project root: `-C` resolved against the current directory
    pub fn project_root(&self) -> anyhow::Result<PathBuf> {
        let cwd = std::env::current_dir().context("reading current directory")?;
        Ok(match &self.directory {
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }

    /// Load configuration and apply command line overrides
    pub fn load_config(
        &self,
        overrides: &PipelineOverrides,
    ) -> anyhow::Result<(Config, Option<PathBuf>)> {
        let cwd = std::env::current_dir().context("reading current directory")?;
        let project_root = self.project_root()?;

        let (mut config, path) = match &self.config {
            Some(path) => {
                let path = cwd.join(path);
                let config = load_config(&path)?;
                (config, Some(path))
            }
            None => load_config_or_default(&project_root)?,
        };

        overrides.apply(&mut config, &cwd);
        validate_config(&config)?;
        Ok((config, path))
    }

    /// Whether human-readable output should be printed
    pub fn text_output(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}
