//! Document files: JSON, or YAML when the extension says so.

use std::path::Path;

use anyhow::{Context, Result};
use lectern_core::{DocumentInstance, LecternError};
use serde_json::Value;

/// Read one document from `path`.
pub fn read_document(path: &Path) -> Result<DocumentInstance, LecternError> {
    let content = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e, "yaml" | "yml"));

    let value: Value = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| LecternError::Serialization(e.to_string()))?
    } else {
        serde_json::from_str(&content).map_err(|e| LecternError::Serialization(e.to_string()))?
    };
    Ok(DocumentInstance::from_value(value)?)
}

/// [`read_document`] with the file named in the error chain.
pub fn load_document(path: &Path) -> Result<DocumentInstance> {
    read_document(path).with_context(|| format!("cannot load document '{}'", path.display()))
}
