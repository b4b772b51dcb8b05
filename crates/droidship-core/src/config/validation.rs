//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_project(config)?;
    validate_build(config)?;
    validate_fdroid(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_project(config: &Config) -> Result<()> {
    if config.project.module.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "project.module".to_string(),
            message: "module cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_build(config: &Config) -> Result<()> {
    validate_flavor(&config.build.flavor)?;

    let prefix = &config.build.property_prefix;
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::InvalidValue {
            field: "build.property_prefix".to_string(),
            message: "must be non-empty and contain only letters, digits and underscores"
                .to_string(),
        });
    }

    validate_domain("build.credentials", &config.build.credentials)
}

fn validate_fdroid(config: &Config) -> Result<()> {
    validate_domain("fdroid.credentials", &config.fdroid.credentials)?;

    if config.fdroid.command.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "fdroid.command".to_string(),
            message: "command cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Flavors become part of Gradle task names, so they must be plain identifiers
pub fn validate_flavor(flavor: &str) -> Result<()> {
    if flavor.is_empty() || !flavor.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidValue {
            field: "build.flavor".to_string(),
            message: format!("'{}' must be a non-empty alphanumeric flavor name", flavor),
        });
    }
    Ok(())
}

fn validate_domain(field: &str, domain: &str) -> Result<()> {
    if domain.split('.').any(|segment| segment.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("'{}' is not a valid credential domain", domain),
        });
    }
    Ok(())
}
