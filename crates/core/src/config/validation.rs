//! Configuration validation before a resolution starts

use super::ResolverConfig;
use crate::error::{Error, Result};

/// Reject configurations the ascender or matcher cannot work with
pub fn validate(config: &ResolverConfig) -> Result<()> {
    if config.build_file_names.is_empty() {
        return Err(Error::ConfigError(
            "at least one build file name is required".to_string(),
        ));
    }
    if config.source_attributes.is_empty() {
        return Err(Error::ConfigError(
            "at least one source attribute is required".to_string(),
        ));
    }

    for name in config
        .build_file_names
        .iter()
        .chain(config.workspace_markers.iter())
    {
        validate_file_name(name)?;
    }

    if let Some(root) = &config.workspace_root {
        if !root.is_dir() {
            return Err(Error::ConfigError(format!(
                "workspace root {} is not a directory",
                root.display()
            )));
        }
    }

    Ok(())
}

fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::ConfigError(format!(
            "`{name}` is not a plain file name"
        )));
    }
    Ok(())
}
