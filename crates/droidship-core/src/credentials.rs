//! Signing credential loading
//!
//! The credentials file is a TOML document with one table per trust domain.
//! Domains are addressed with dotted names, so `build.play` resolves to the
//! `[build.play]` table:
//!
//! ```toml
//! [build.play]
//! keystore = "<base64 keystore>"
//! keystore_password = "..."
//! key_alias = "release"
//! key_password = "..."
//!
//! [fdroid]
//! keystore = "<base64 keystore>"
//! keystore_password = "..."
//! key_alias = "repokey"
//! key_password = "..."
//! ```

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument};

use crate::error::{ConfigError, Result};

/// Signing credentials for one trust domain.
///
/// Secret values are never printed by `Debug`.
#[derive(Debug)]
pub struct CredentialSet {
    keystore_blob: SecretString,
    store_password: SecretString,
    key_alias: String,
    key_password: SecretString,
}

impl CredentialSet {
    /// Build a credential set from its four values
    pub fn new(
        keystore_blob: impl Into<String>,
        store_password: impl Into<String>,
        key_alias: impl Into<String>,
        key_password: impl Into<String>,
    ) -> Self {
        Self {
            keystore_blob: SecretString::from(keystore_blob.into()),
            store_password: SecretString::from(store_password.into()),
            key_alias: key_alias.into(),
            key_password: SecretString::from(key_password.into()),
        }
    }

    /// Base64 keystore text with all whitespace removed
    pub fn keystore_base64(&self) -> String {
        self.keystore_blob
            .expose_secret()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// Keystore password
    pub fn store_password(&self) -> &str {
        self.store_password.expose_secret()
    }

    /// Key alias inside the keystore
    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }

    /// Key password
    pub fn key_password(&self) -> &str {
        self.key_password.expose_secret()
    }
}

/// Parsed credentials file
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    root: toml::Table,
}

impl CredentialStore {
    /// Load the credentials file
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        info!("loading signing credentials");

        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::parse(path, &content)
    }

    /// Parse credentials from TOML text; `path` is only used for messages
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let root: toml::Table = content.parse().map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    /// Path the credentials were read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extract the credential set for a dotted domain name
    pub fn credentials(&self, domain: &str) -> Result<CredentialSet> {
        let table = self
            .domain_table(domain)
            .ok_or_else(|| ConfigError::MissingDomain {
                path: self.path.clone(),
                domain: domain.to_string(),
            })?;

        let field = |key: &str| -> Result<String> {
            table
                .get(key)
                .and_then(|value| value.as_str())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingField(format!("{}.{}", domain, key)))
        };

        let credentials = CredentialSet::new(
            field("keystore")?,
            field("keystore_password")?,
            field("key_alias")?,
            field("key_password")?,
        );

        debug!(domain, key_alias = credentials.key_alias(), "credentials resolved");
        Ok(credentials)
    }

    fn domain_table(&self, domain: &str) -> Option<&toml::Table> {
        let mut segments = domain.split('.');
        let first = segments.next()?;
        let mut table = self.root.get(first)?.as_table()?;
        for segment in segments {
            table = table.get(segment)?.as_table()?;
        }
        Some(table)
    }
}
