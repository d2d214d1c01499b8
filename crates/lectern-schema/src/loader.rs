//! # Schema Directory Loader
//!
//! Reads document type declarations from a directory and builds a
//! [`Catalog`] from them.
//!
//! The directory's `index.yaml` fixes registration order:
//!
//! ```yaml
//! types:
//!   - home-page.yaml
//!   - doctor.yaml
//! ```
//!
//! Without an index, every `*.yaml`, `*.yml` and `*.json` file is loaded in
//! file-name order. YAML is read straight into JSON values before
//! deserialization, so both formats accept exactly the same declarations.

use std::path::{Path, PathBuf};

use lectern_core::SchemaDefinitionError;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::tree::{define_document_type, DocumentTypeSpec, SchemaTree};

/// Name of the file fixing registration order.
pub const INDEX_FILE: &str = "index.yaml";

/// Errors raised while loading a schema directory.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A file or directory could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file is not a well-formed declaration.
    #[error("cannot parse '{path}': {reason}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// What the parser reported.
        reason: String,
    },

    /// A declaration was parsed but violates a schema constraint.
    #[error("invalid document type in '{path}': {source}")]
    Definition {
        /// The offending file.
        path: PathBuf,
        /// The violated constraint.
        #[source]
        source: SchemaDefinitionError,
    },

    /// The types are individually valid but do not form a catalog.
    #[error("cannot build catalog: {0}")]
    Catalog(#[source] SchemaDefinitionError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Index {
    types: Vec<PathBuf>,
}

/// Load every document type under `dir` into a catalog.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Catalog, LoadError> {
    let dir = dir.as_ref();
    let trees = type_files(dir)?
        .iter()
        .map(|file| load_type_file(file))
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::from_trees(trees).map_err(LoadError::Catalog)
}

/// The declaration files of `dir`, in registration order.
pub fn type_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let index_path = dir.join(INDEX_FILE);
    if index_path.is_file() {
        let value = read_value(&index_path)?;
        let index: Index = serde_json::from_value(value).map_err(|e| LoadError::Parse {
            path: index_path.clone(),
            reason: e.to_string(),
        })?;
        return Ok(index.types.into_iter().map(|file| dir.join(file)).collect());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_declaration = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e, "yaml" | "yml" | "json"));
        if path.is_file() && is_declaration {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load one document type declaration.
pub fn load_type_file(path: &Path) -> Result<SchemaTree, LoadError> {
    let value = read_value(path)?;
    let spec: DocumentTypeSpec = serde_json::from_value(value).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    define_document_type(spec).map_err(|source| LoadError::Definition {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON or YAML file (chosen by extension) into a JSON value.
pub fn read_value(path: &Path) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |reason: String| LoadError::Parse {
        path: path.to_path_buf(),
        reason,
    };
    if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
    } else {
        serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))
    }
}
