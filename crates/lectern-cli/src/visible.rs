//! # Visible Subcommand
//!
//! Prints `true` or `false`: whether a field is shown for a document.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use lectern_core::FieldPath;
use lectern_schema::Catalog;

use crate::input::load_document;

/// Arguments for the visible subcommand.
#[derive(Args, Debug)]
pub struct VisibleArgs {
    /// Document type.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Field path, e.g. `about.video` or `menuItems[0].externalUrl`.
    #[arg(long)]
    pub field: FieldPath,

    /// Document file (JSON, or YAML by extension).
    pub file: PathBuf,
}

/// Execute the visible subcommand.
pub fn run_visible<W: Write>(args: &VisibleArgs, catalog: &Catalog, out: &mut W) -> Result<u8> {
    let doc = load_document(&args.file)?;
    let visible = catalog.is_field_visible(&args.type_name, &args.field, &doc)?;
    writeln!(out, "{visible}")?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{studio, text, write};

    fn visible(field: &str, yaml: &str) -> Result<String> {
        let dir = tempfile::tempdir().unwrap();
        let args = VisibleArgs {
            type_name: "homePage".into(),
            field: field.parse().unwrap(),
            file: write(dir.path(), "home.yaml", yaml),
        };
        let mut out = Vec::new();
        run_visible(&args, &studio(), &mut out)?;
        Ok(text(out))
    }

    #[test]
    fn test_media_type_switch() {
        let video = "about:\n  mediaType: video\n";
        assert_eq!(visible("about.video", video).unwrap(), "true\n");
        assert_eq!(visible("about.image", video).unwrap(), "false\n");
        assert_eq!(visible("about.image", "{}\n").unwrap(), "true\n");
    }

    #[test]
    fn test_unknown_field_fails() {
        assert!(visible("about.poster", "{}\n").is_err());
    }
}
