//! CLI subcommands.

pub mod analyze;
pub mod qc;
pub mod stats;

use anyhow::{Context, Result};
use std::path::Path;

use gwas_matrix::ColumnRef;

/// Read the raw upload from a file path.
pub(crate) fn read_input(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read input file: {path}"))
}

/// Write JSON output to a file, or stdout when no path is given.
pub(crate) fn write_output(json: &str, path: Option<&str>) -> Result<()> {
    match path {
        Some(p) => {
            std::fs::write(Path::new(p), json)
                .with_context(|| format!("Failed to write output file: {p}"))?;
            tracing::info!("Results written to {p}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Interpret a phenotype column flag as an index when numeric,
/// otherwise a header name.
pub(crate) fn parse_column_ref(s: &str) -> ColumnRef {
    match s.parse::<usize>() {
        Ok(i) => ColumnRef::Index(i),
        Err(_) => ColumnRef::Name(s.to_string()),
    }
}

/// Parse a delimiter flag ("," / "tab" / any single character).
pub(crate) fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "tab" | "\\t" => Ok(b'\t'),
        _ if s.len() == 1 => Ok(s.as_bytes()[0]),
        _ => anyhow::bail!("delimiter must be a single character or 'tab', got '{s}'"),
    }
}
