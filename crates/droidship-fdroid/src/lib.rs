//! droidship F-Droid - Publish builds to an F-Droid repository workspace
//!
//! Publishing copies the per-ABI APKs into `repo/`, bumps
//! `CurrentVersionCode` in `metadata/<package>.yml` and regenerates the
//! signed index with `fdroid update`.

pub mod error;
pub mod metadata;
pub mod publisher;

pub use error::{PublishError, Result};
pub use metadata::{update_current_version_code, MetadataFile};
pub use publisher::{is_universal_artifact, FdroidPublisher, PublishReport};
