//! droidship Gradle - Signed Android release builds
//!
//! Runs `assemble<Flavor>Release` and `bundle<Flavor>Release` with an
//! ephemeral signing keystore, then recovers artifact paths, the version code
//! and the application id from Gradle's `output-metadata.json`.

pub mod builder;
pub mod error;
pub mod manifest;

pub use builder::{capitalize_flavor, GradleBuilder};
pub use error::{BuildError, Result};
pub use manifest::{read_build_manifest, OUTPUT_METADATA_FILE};
