//! # Validate Subcommand
//!
//! Validates document files and prints their findings, either as text:
//!
//! ```text
//! content/jane.json: doctor: 1 error, 0 warnings
//!   slug [error]: required
//! ```
//!
//! or, with `--json`, as an array of per-document outcomes.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lectern_core::Severity;
use lectern_schema::{Catalog, ValidationFinding};
use serde::Serialize;

use crate::document_type;
use crate::input::load_document;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document type; defaults to each document's `_type`.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: Option<String>,

    /// Print outcomes as JSON.
    #[arg(long)]
    pub json: bool,

    /// Document files (JSON, or YAML by extension).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Outcome {
    file: PathBuf,
    document_type: String,
    acceptable: bool,
    findings: Vec<ValidationFinding>,
}

impl Outcome {
    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

/// Execute the validate subcommand.
pub fn run_validate<W: Write>(args: &ValidateArgs, catalog: &Catalog, out: &mut W) -> Result<u8> {
    let mut outcomes = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let doc = load_document(file)?;
        let type_name = document_type(args.type_name.as_deref(), &doc)?.to_string();
        let report = catalog
            .validate(&type_name, &doc)
            .with_context(|| format!("cannot validate '{}'", file.display()))?;
        tracing::info!(
            file = %file.display(),
            document_type = %type_name,
            findings = report.len(),
            "validated document"
        );
        outcomes.push(Outcome {
            file: file.clone(),
            document_type: type_name,
            acceptable: report.is_acceptable(),
            findings: report.into_findings(),
        });
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &outcomes)?;
        writeln!(out)?;
    } else {
        for outcome in &outcomes {
            write_outcome(out, outcome)?;
        }
    }

    Ok(if outcomes.iter().all(|o| o.acceptable) { 0 } else { 1 })
}

fn write_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> Result<()> {
    let head = format!("{}: {}", outcome.file.display(), outcome.document_type);
    if outcome.findings.is_empty() {
        writeln!(out, "{head}: ok")?;
        return Ok(());
    }
    writeln!(
        out,
        "{head}: {}, {}",
        plural(outcome.count(Severity::Error), "error"),
        plural(outcome.count(Severity::Warning), "warning")
    )?;
    for finding in &outcome.findings {
        writeln!(out, "{finding}")?;
    }
    Ok(())
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
