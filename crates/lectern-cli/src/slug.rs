//! # Slug Subcommand
//!
//! Prints the slug suggested for a slug field from its source field.
//! Exits with `1` when nothing can be suggested.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use lectern_core::FieldPath;
use lectern_schema::Catalog;

use crate::input::load_document;

/// Arguments for the slug subcommand.
#[derive(Args, Debug)]
pub struct SlugArgs {
    /// Document type.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Path of the slug field.
    #[arg(long)]
    pub field: FieldPath,

    /// Document file (JSON, or YAML by extension).
    pub file: PathBuf,
}

/// Execute the slug subcommand.
pub fn run_slug<W: Write>(args: &SlugArgs, catalog: &Catalog, out: &mut W) -> Result<u8> {
    let doc = load_document(&args.file)?;
    match catalog.suggest_slug(&args.type_name, &args.field, &doc)? {
        Some(slug) => {
            writeln!(out, "{slug}")?;
            Ok(0)
        }
        None => {
            tracing::warn!(field = %args.field, "source field is empty; no slug suggested");
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{studio, text, write};

    fn args(dir: &std::path::Path, field: &str, json: &str) -> SlugArgs {
        SlugArgs {
            type_name: "doctor".into(),
            field: field.parse().unwrap(),
            file: write(dir, "doctor.json", json),
        }
    }

    #[test]
    fn test_suggests_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let code = run_slug(
            &args(dir.path(), "slug", r#"{"name": "Dr. Jane Smith"}"#),
            &studio(),
            &mut out,
        )
        .unwrap();
        assert_eq!(code, 0);
        assert_eq!(text(out), "dr-jane-smith\n");
    }

    #[test]
    fn test_empty_source_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let code = run_slug(&args(dir.path(), "slug", "{}"), &studio(), &mut out).unwrap();
        assert_eq!(code, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_non_slug_field_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_slug(&args(dir.path(), "name", "{}"), &studio(), &mut Vec::new());
        assert!(result.is_err());
    }
}
