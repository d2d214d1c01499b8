//! # lectern CLI entry point
//!
//! Parses arguments, loads the studio configuration and the schema
//! directory, installs the document type catalog and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lectern_cli::config::StudioConfig;
use lectern_cli::preview::{run_preview, PreviewArgs};
use lectern_cli::slug::{run_slug, SlugArgs};
use lectern_cli::types::run_types;
use lectern_cli::validate::{run_validate, ValidateArgs};
use lectern_cli::visible::{run_visible, VisibleArgs};
use lectern_cli::{resolve_schema_dir, SCHEMA_DIR_ENV};
use lectern_schema::{load_dir, Catalog};

/// Lectern content studio CLI.
///
/// Validates documents against the studio's document types and prints
/// previews, field visibility and slug suggestions.
#[derive(Parser, Debug)]
#[command(name = "lectern", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the studio configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the document type declarations.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered document types.
    Types,

    /// Validate documents and print their findings.
    Validate(ValidateArgs),

    /// Print the preview summary of a document.
    Preview(PreviewArgs),

    /// Print whether a field is visible for a document.
    Visible(VisibleArgs),

    /// Print the slug suggested for a slug field.
    Slug(SlugArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = StudioConfig::load(cli.config.as_deref()).context("cannot load studio configuration")?;
    tracing::debug!(
        project_id = %config.project_id,
        dataset = %config.dataset,
        studio = %config.display_title(),
        "loaded studio configuration"
    );

    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let schema_dir = resolve_schema_dir(
        cli.schema_dir.as_deref(),
        std::env::var_os(SCHEMA_DIR_ENV).map(PathBuf::from),
        &cwd,
    )
    .context("no schema directory found; pass --schema-dir or set STUDIO_SCHEMA_DIR")?;

    let catalog: &Catalog = load_dir(&schema_dir)
        .with_context(|| format!("cannot load document types from '{}'", schema_dir.display()))?
        .install()?;
    tracing::info!(
        types = catalog.len(),
        schema_dir = %schema_dir.display(),
        "loaded document types"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Types => run_types(&config, catalog, &mut out),
        Commands::Validate(args) => run_validate(&args, catalog, &mut out),
        Commands::Preview(args) => run_preview(&args, catalog, &mut out),
        Commands::Visible(args) => run_visible(&args, catalog, &mut out),
        Commands::Slug(args) => run_slug(&args, catalog, &mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_types() {
        let cli = Cli::try_parse_from(["lectern", "types"]).unwrap();
        assert!(matches!(cli.command, Commands::Types));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn cli_parse_validate_many_files() {
        let cli = Cli::try_parse_from(["lectern", "-vv", "validate", "--json", "a.json", "b.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        if let Commands::Validate(args) = cli.command {
            assert!(args.json);
            assert!(args.type_name.is_none());
            assert_eq!(args.files, vec![PathBuf::from("a.json"), PathBuf::from("b.yaml")]);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_requires_files() {
        assert!(Cli::try_parse_from(["lectern", "validate"]).is_err());
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lectern",
            "preview",
            "--type",
            "doctor",
            "jane.json",
            "--schema-dir",
            "schemas",
            "--config",
            "studio.yaml",
        ])
        .unwrap();
        assert_eq!(cli.schema_dir, Some(PathBuf::from("schemas")));
        assert_eq!(cli.config, Some(PathBuf::from("studio.yaml")));
        if let Commands::Preview(args) = cli.command {
            assert_eq!(args.type_name.as_deref(), Some("doctor"));
        } else {
            panic!("expected preview");
        }
    }

    #[test]
    fn cli_parse_field_path() {
        let cli = Cli::try_parse_from([
            "lectern",
            "visible",
            "--type",
            "sidebar",
            "--field",
            "menuItems[0].externalUrl",
            "sidebar.json",
        ])
        .unwrap();
        if let Commands::Visible(args) = cli.command {
            assert_eq!(args.field.to_string(), "menuItems[0].externalUrl");
        } else {
            panic!("expected visible");
        }
    }

    #[test]
    fn cli_parse_rejects_bad_field_path() {
        let parsed = Cli::try_parse_from([
            "lectern", "slug", "--type", "doctor", "--field", "slug..x", "d.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_parse_slug_requires_type() {
        assert!(Cli::try_parse_from(["lectern", "slug", "--field", "slug", "d.json"]).is_err());
    }
}
