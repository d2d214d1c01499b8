//! # lectern-cli: Lectern Studio Command-Line Interface
//!
//! Loads the studio's document types from a schema directory and runs the
//! schema engine against document files.
//!
//! ## Subcommands
//!
//! - `lectern types`: registered document types with field counts.
//! - `lectern validate`: findings for one or more documents.
//! - `lectern preview`: the preview summary of a document.
//! - `lectern visible`: whether a field is shown for a document.
//! - `lectern slug`: the slug suggested for a slug field.
//!
//! ```bash
//! lectern validate content/doctors/*.json
//! lectern preview --type homePage content/home.yaml --json
//! lectern visible --type homePage --field about.video content/home.yaml
//! ```
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when a document has error findings (or no slug can
//! be suggested), `2` when the command itself fails.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed arguments,
//!   the catalog and an output sink.
//! - Handlers delegate to `lectern-schema`; no schema logic here.

pub mod config;
pub mod input;
pub mod preview;
pub mod slug;
pub mod types;
pub mod validate;
pub mod visible;

use std::path::{Path, PathBuf};

use anyhow::Result;
use lectern_core::DocumentInstance;
use lectern_schema::loader::INDEX_FILE;

/// Environment variable naming the schema directory.
pub const SCHEMA_DIR_ENV: &str = "STUDIO_SCHEMA_DIR";

/// Resolve the schema directory.
///
/// An explicit flag wins, then `STUDIO_SCHEMA_DIR`, then the nearest
/// `schemas/` directory holding an index, walking up from `cwd`.
pub fn resolve_schema_dir(flag: Option<&Path>, env: Option<PathBuf>, cwd: &Path) -> Option<PathBuf> {
    if let Some(dir) = flag {
        return Some(dir.to_path_buf());
    }
    if let Some(dir) = env {
        return Some(dir);
    }
    cwd.ancestors()
        .map(|dir| dir.join("schemas"))
        .find(|schemas| schemas.join(INDEX_FILE).is_file())
}

/// The document type to use: the explicit one, else the document's `_type`.
pub fn document_type<'a>(explicit: Option<&'a str>, doc: &'a DocumentInstance) -> Result<&'a str> {
    explicit
        .or_else(|| doc.type_name())
        .ok_or_else(|| anyhow::anyhow!("document has no `_type`; pass --type"))
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_wins_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_schema_dir(
            Some(Path::new("/explicit")),
            Some(PathBuf::from("/from-env")),
            dir.path(),
        );
        assert_eq!(resolved, Some(PathBuf::from("/explicit")));

        let resolved = resolve_schema_dir(None, Some(PathBuf::from("/from-env")), dir.path());
        assert_eq!(resolved, Some(PathBuf::from("/from-env")));
    }

    #[test]
    fn test_walks_up_to_schema_index() {
        let root = tempfile::tempdir().unwrap();
        let schemas = root.path().join("schemas");
        let nested = root.path().join("content").join("doctors");
        std::fs::create_dir_all(&schemas).unwrap();
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(schemas.join(INDEX_FILE), "types: []\n").unwrap();

        assert_eq!(resolve_schema_dir(None, None, &nested), Some(schemas));
    }

    #[test]
    fn test_no_schema_dir_found() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("schemas")).unwrap();
        assert_eq!(resolve_schema_dir(None, None, root.path()), None);
    }

    #[test]
    fn test_document_type_resolution() {
        let typed = DocumentInstance::from_value(json!({"_type": "doctor"})).unwrap();
        let untyped = DocumentInstance::from_value(json!({})).unwrap();
        assert_eq!(document_type(None, &typed).unwrap(), "doctor");
        assert_eq!(document_type(Some("seo"), &typed).unwrap(), "seo");
        assert!(document_type(None, &untyped).is_err());
    }
}
