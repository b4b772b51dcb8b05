//! Default configuration values

/// Default configuration file name
pub const DEFAULT_CONFIG_TOML: &str = "droidship.toml";

/// Alternative (hidden) configuration file name
pub const ALT_CONFIG_FILE: &str = ".droidship.toml";

/// Credentials file, relative to the project root
pub const DEFAULT_CREDENTIALS_FILE: &str = "release-creds.toml";

/// Gradle application module
pub const DEFAULT_MODULE: &str = "app";

/// Store flavor built by `release`
pub const DEFAULT_FLAVOR: &str = "play";

/// Prefix for the Gradle signing properties
pub const DEFAULT_PROPERTY_PREFIX: &str = "SESSION";

/// Credential domain used to sign the store build
pub const DEFAULT_BUILD_DOMAIN: &str = "build.play";

/// Credential domain used to sign the F-Droid index
pub const DEFAULT_REPOSITORY_DOMAIN: &str = "fdroid";

/// Scratch directory for ephemeral keystores, relative to the project root
pub const DEFAULT_KEYSTORE_DIR: &str = "build";

/// F-Droid server tool
pub const DEFAULT_INDEX_COMMAND: &str = "fdroid";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![DEFAULT_CONFIG_TOML, ALT_CONFIG_FILE]
}

/// Default arguments for the index tool
pub fn default_index_args() -> Vec<String> {
    vec!["update".to_string(), "-v".to_string()]
}
