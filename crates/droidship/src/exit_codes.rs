//! Exit codes for the CLI

#![allow(dead_code)]

use droidship_core::{ConfigError, SdkError};
use droidship_fdroid::PublishError;
use droidship_gradle::BuildError;
use droidship_signing::SigningError;

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration or credentials error
pub const CONFIG_ERROR: i32 = 2;

/// Android SDK not found
pub const SDK_ERROR: i32 = 3;

/// Build tool failed
pub const BUILD_ERROR: i32 = 10;

/// Build output manifest missing or malformed
pub const MANIFEST_ERROR: i32 = 11;

/// Artifact copy or metadata update failed
pub const PUBLISH_ERROR: i32 = 12;

/// Index tool failed
pub const INDEX_ERROR: i32 = 13;

/// Map the first recognised error in the chain to an exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<BuildError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<PublishError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<SdkError>() {
            return e.exit_code();
        }
        if cause.downcast_ref::<SigningError>().is_some() {
            return CONFIG_ERROR;
        }
    }
    ERROR
}
