//! droidship Core - Shared foundations for Android release automation
//!
//! This crate provides the configuration layer, signing credential loading,
//! the error taxonomy, the external tool runner seam and Android SDK
//! discovery used by the build and publish crates.

pub mod config;
pub mod credentials;
pub mod error;
pub mod process;
pub mod sdk;
pub mod types;

pub use config::{load_config, load_config_or_default, Config, CredentialTransport};
pub use credentials::{CredentialSet, CredentialStore};
pub use error::{ConfigError, Result, SdkError};
pub use process::{SystemRunner, ToolInvocation, ToolOutcome, ToolRunner};
pub use sdk::{resolve_sdk_dir, AndroidSdk};
pub use types::BuildResult;
