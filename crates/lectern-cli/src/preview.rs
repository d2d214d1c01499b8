//! # Preview Subcommand
//!
//! Prints the list-view summary of one document: the title, then the
//! subtitle and the media asset when present.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lectern_core::registry::asset_ref;
use lectern_schema::Catalog;

use crate::document_type;
use crate::input::load_document;

/// Arguments for the preview subcommand.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Document type; defaults to the document's `_type`.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: Option<String>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Document file (JSON, or YAML by extension).
    pub file: PathBuf,
}

/// Execute the preview subcommand.
pub fn run_preview<W: Write>(args: &PreviewArgs, catalog: &Catalog, out: &mut W) -> Result<u8> {
    let doc = load_document(&args.file)?;
    let type_name = document_type(args.type_name.as_deref(), &doc)?;
    let summary = catalog
        .project(type_name, &doc)
        .with_context(|| format!("cannot preview '{}'", args.file.display()))?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
        return Ok(0);
    }

    writeln!(out, "{}", summary.title)?;
    if let Some(subtitle) = &summary.subtitle {
        writeln!(out, "{subtitle}")?;
    }
    if let Some(media) = &summary.media {
        writeln!(out, "media: {}", asset_ref(media).unwrap_or("(inline)"))?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{studio, text, write};

    #[test]
    fn test_text_summary() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            dir.path(),
            "jane.json",
            r#"{
                "_type": "doctor",
                "name": "Dr. Jane Smith",
                "title": "Fibroid Specialist",
                "photo": {"_type": "image", "asset": {"_ref": "image-abc-400x400-jpg"}}
            }"#,
        );
        let args = PreviewArgs {
            type_name: None,
            json: false,
            file,
        };
        let mut out = Vec::new();
        assert_eq!(run_preview(&args, &studio(), &mut out).unwrap(), 0);
        assert_eq!(
            text(out),
            "Dr. Jane Smith\nFibroid Specialist\nmedia: image-abc-400x400-jpg\n"
        );
    }

    #[test]
    fn test_json_summary_with_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "seo.yaml", "noIndex: true\n");
        let args = PreviewArgs {
            type_name: Some("seo".into()),
            json: true,
            file,
        };
        let mut out = Vec::new();
        run_preview(&args, &studio(), &mut out).unwrap();
        let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            summary,
            serde_json::json!({"title": "Untitled SEO", "subtitle": "No description"})
        );
    }

    #[test]
    fn test_unknown_type_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "page.json", r#"{"_type": "landingPage"}"#);
        let args = PreviewArgs {
            type_name: None,
            json: false,
            file,
        };
        let err = run_preview(&args, &studio(), &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("landingPage"));
    }
}
