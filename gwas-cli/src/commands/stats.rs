//! Descriptive-statistics pass: per-marker mean, SD, and MAF.
//!
//! gwas stats --input data.csv [--output stats.json]

use anyhow::Result;
use clap::Args;
use tracing::info;

use gwas_core::descriptive::summarize_markers;
use gwas_matrix::{parse_matrix, ParseOptions};

use super::{parse_delimiter, read_input, write_output};

#[derive(Args)]
pub struct StatsArgs {
    /// Input delimited genotype file
    #[arg(long)]
    input: String,

    /// Output JSON file (stdout if omitted)
    #[arg(long)]
    output: Option<String>,

    /// Column delimiter (single character, or 'tab')
    #[arg(long, default_value = ",")]
    delimiter: String,

    /// Maximum tolerated fraction of unparseable genotype cells
    #[arg(long, default_value = "0.2")]
    rejection_threshold: f64,
}

pub fn run(args: StatsArgs) -> Result<()> {
    info!("=== GWAS-RS: Descriptive Statistics ===");

    let raw = read_input(&args.input)?;
    let opts = ParseOptions {
        delimiter: parse_delimiter(&args.delimiter)?,
        rejection_threshold: args.rejection_threshold,
        ..ParseOptions::default()
    };

    let matrix = parse_matrix(&raw, &opts)?;
    let stats = summarize_markers(&matrix);
    info!("Summarized {} markers", stats.len());

    let json = serde_json::to_string_pretty(&stats)?;
    write_output(&json, args.output.as_deref())
}
