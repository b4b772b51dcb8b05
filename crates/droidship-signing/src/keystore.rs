//! Scoped keystore files

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::error::{Result, SigningError};

/// Keystore container format, which decides the file suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystoreKind {
    /// Java keystore, used for the store build
    Jks,
    /// PKCS#12, used for the F-Droid repository key
    Pkcs12,
}

impl KeystoreKind {
    /// File name suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Jks => ".jks",
            Self::Pkcs12 => ".p12",
        }
    }
}

/// A decoded keystore on disk.
///
/// The file is created with owner-only permissions and removed when the value
/// is dropped, including during unwinding and early returns. Use
/// [`EphemeralKeystore::close`] to observe removal errors.
#[derive(Debug)]
pub struct EphemeralKeystore {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl EphemeralKeystore {
    /// Decode `keystore_base64` into a new file inside `dir`.
    ///
    /// `dir` is created if missing. The file name is `<prefix><random><suffix>`.
    pub fn materialize(
        keystore_base64: &str,
        dir: &Path,
        prefix: &str,
        kind: KeystoreKind,
    ) -> Result<Self> {
        let bytes = STANDARD.decode(keystore_base64.trim())?;
        if bytes.is_empty() {
            return Err(SigningError::EmptyKeystore);
        }

        let write_failed = |source| SigningError::WriteFailed {
            dir: dir.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_failed)?;

        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(kind.suffix())
            .tempfile_in(dir)
            .map_err(write_failed)?;

        // On failure `file` is dropped here, which deletes the partial keystore
        file.write_all(&bytes).map_err(write_failed)?;
        file.as_file().sync_all().map_err(write_failed)?;

        let guard = file.into_temp_path();
        let path = guard.to_path_buf();
        info!(path = %path.display(), "materialized keystore");
        Ok(Self {
            path,
            guard: Some(guard),
        })
    }

    /// Location of the keystore file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the keystore file as an owned path
    pub fn to_path_buf(&self) -> PathBuf {
        self.path.clone()
    }

    /// Remove the keystore now, reporting failure
    pub fn close(mut self) -> Result<()> {
        match self.guard.take() {
            Some(guard) => {
                info!(path = %self.path.display(), "cleaning up keystore file");
                guard.close().map_err(|source| SigningError::CleanupFailed {
                    path: self.path.clone(),
                    source,
                })
            }
            None => Ok(()),
        }
    }
}

impl Drop for EphemeralKeystore {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            debug!(path = %self.path.display(), "cleaning up keystore file on drop");
            if let Err(e) = guard.close() {
                warn!(path = %self.path.display(), error = %e, "failed to remove keystore file");
            }
        }
    }
}
