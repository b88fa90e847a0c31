//! Serialization of resource listings to YAML or JSON.

use crate::listing::ResourceListing;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a resource listing to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(listing: &ResourceListing) -> Result<String> {
    debug!("Serializing resource listing to YAML");
    serde_yaml::to_string(listing).context("Failed to serialize resource listing to YAML")
}

/// Serializes a resource listing to pretty-printed JSON.
///
/// This is the format documentation UIs consume directly.
pub fn serialize_json(listing: &ResourceListing) -> Result<String> {
    debug!("Serializing resource listing to JSON");
    serde_json::to_string_pretty(listing).context("Failed to serialize resource listing to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// Overwrites the file if it exists.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
