//! droidship Signing - Ephemeral keystores for Android signing
//!
//! Signing keystores are stored base64-encoded alongside their passwords.
//! Gradle and the F-Droid tools need them as files, so this crate decodes a
//! keystore into a uniquely named file that exists only while the value that
//! owns it is alive.

pub mod error;
pub mod keystore;

pub use error::{Result, SigningError};
pub use keystore::{EphemeralKeystore, KeystoreKind};
