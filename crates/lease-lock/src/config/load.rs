//! Configuration loading from TOML

use std::path::Path;

use super::types::LockOptions;
use crate::{LockError, Result};

impl LockOptions {
    /// Parse options from TOML text. Missing or zero keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the TOML is malformed or the values fail
    /// validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options = toml::from_str::<Self>(content)
            .map_err(|e| {
                LockError::invalid_configuration(format!("Failed to parse lock options: {e}"))
            })?
            .normalized();
        options.validate()?;
        Ok(options)
    }
}

/// Load lock options from a TOML file.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if:
/// - Path is a directory instead of a file
/// - File cannot be read
/// - TOML is malformed or values are invalid
pub fn load_toml_file(path: &Path) -> Result<LockOptions> {
    if path.is_dir() {
        return Err(LockError::invalid_configuration(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        LockError::invalid_configuration(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    let options = LockOptions::from_toml_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        timeout_ms = options.timeout.as_millis(),
        poll_interval_ms = options.poll_interval.as_millis(),
        "Loaded lock options"
    );
    Ok(options)
}
