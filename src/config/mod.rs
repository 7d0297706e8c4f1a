//! Configuration module
//!
//! Handles loading and validating settings from JSON/YAML files and environment variables.

mod settings;

pub use settings::*;

use crate::error::Result;
use std::path::Path;
use tracing::info;

/// Load settings from a file, apply environment overrides and validate
pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    info!("Loading settings from: {}", path.display());

    let mut settings = Settings::from_file(path)?;
    settings.merge_env();
    settings.validate()?;

    Ok(settings)
}
