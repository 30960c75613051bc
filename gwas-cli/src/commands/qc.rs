//! QC-only pass over an uploaded genotype table.
//!
//! gwas qc --input data.csv [--output qc.json]

use anyhow::Result;
use clap::Args;
use tracing::info;

use gwas_core::qc::run_qc;
use gwas_matrix::{parse_matrix, ParseOptions};

use super::{parse_delimiter, read_input, write_output};

#[derive(Args)]
pub struct QcArgs {
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

    /// Per-sample missingness fraction above which a sample is flagged
    #[arg(long, default_value = "0.1")]
    sample_missingness_limit: f64,
}

pub fn run(args: QcArgs) -> Result<()> {
    info!("=== GWAS-RS: Quality Control ===");

    let raw = read_input(&args.input)?;
    let opts = ParseOptions {
        delimiter: parse_delimiter(&args.delimiter)?,
        rejection_threshold: args.rejection_threshold,
        ..ParseOptions::default()
    };

    let matrix = parse_matrix(&raw, &opts)?;
    let report = run_qc(&matrix, args.sample_missingness_limit);
    info!(
        "{} samples x {} markers, missing rate {:.4}",
        report.total_samples, report.total_markers, report.missing_data_rate
    );

    let json = serde_json::to_string_pretty(&report)?;
    write_output(&json, args.output.as_deref())
}
