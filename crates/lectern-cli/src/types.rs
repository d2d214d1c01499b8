//! # Types Subcommand
//!
//! Lists the registered document types in registration order.

use std::io::Write;

use anyhow::Result;
use lectern_schema::Catalog;

use crate::config::StudioConfig;

/// Execute the types subcommand.
pub fn run_types<W: Write>(config: &StudioConfig, catalog: &Catalog, out: &mut W) -> Result<u8> {
    writeln!(
        out,
        "{} ({}/{})",
        config.display_title(),
        config.project_id,
        config.dataset
    )?;
    writeln!(out)?;
    for tree in catalog.trees() {
        writeln!(
            out,
            "  {:<12} {:<20} {} fields",
            tree.name(),
            tree.display_title(),
            tree.field_count()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Total: {} document types", catalog.len())?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{studio, text};

    #[test]
    fn test_lists_types_in_order() {
        let config = StudioConfig {
            project_id: "abc123".into(),
            dataset: "production".into(),
            studio_host: "hnmc".into(),
            title: None,
        };
        let mut out = Vec::new();
        assert_eq!(run_types(&config, &studio(), &mut out).unwrap(), 0);

        let output = text(out);
        assert!(output.starts_with("hnmc (abc123/production)\n"));
        let home = output.find("homePage").unwrap();
        let footer = output.find("footer").unwrap();
        assert!(home < footer);
        assert!(output.contains("Doctor"));
        assert!(output.ends_with("Total: 6 document types\n"));
    }
}
