//! Full analysis: QC + descriptive stats + association + plot arrays.
//!
//! gwas analyze --input data.csv --phenotype-kind categorical \
//!     --phenotype-col status --output results.json

use anyhow::Result;
use clap::Args;
use tracing::info;

use gwas_core::{analyze, AnalysisConfig};
use gwas_matrix::PhenotypeKind;

use super::{parse_column_ref, parse_delimiter, read_input, write_output};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input delimited genotype file
    #[arg(long)]
    input: String,

    /// Output JSON file (stdout if omitted)
    #[arg(long)]
    output: Option<String>,

    /// Column delimiter (single character, or 'tab')
    #[arg(long, default_value = ",")]
    delimiter: String,

    /// Phenotype type: categorical (chi-square) or continuous (regression)
    #[arg(long, value_enum)]
    phenotype_kind: PhenotypeKindArg,

    /// Phenotype column, by header name or zero-based index
    #[arg(long)]
    phenotype_col: String,

    /// Significance threshold for ranked selection
    #[arg(long, default_value = "5e-8")]
    significance_threshold: f64,

    /// Maximum tolerated fraction of unparseable genotype cells
    #[arg(long, default_value = "0.2")]
    rejection_threshold: f64,

    /// Disable the 0.5 continuity correction for zero-cell odds ratios
    #[arg(long, default_value = "false")]
    no_continuity_correction: bool,

    /// Per-sample missingness fraction flagged in the QC report
    #[arg(long, default_value = "0.1")]
    sample_missingness_limit: f64,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum PhenotypeKindArg {
    Categorical,
    Continuous,
}

impl From<PhenotypeKindArg> for PhenotypeKind {
    fn from(arg: PhenotypeKindArg) -> Self {
        match arg {
            PhenotypeKindArg::Categorical => PhenotypeKind::Categorical,
            PhenotypeKindArg::Continuous => PhenotypeKind::Continuous,
        }
    }
}

impl AnalyzeArgs {
    fn to_config(&self) -> Result<AnalysisConfig> {
        let mut cfg = AnalysisConfig::new(self.phenotype_kind.into());
        cfg.delimiter = parse_delimiter(&self.delimiter)?;
        cfg.phenotype_column = Some(parse_column_ref(&self.phenotype_col));
        cfg.significance_threshold = self.significance_threshold;
        cfg.rejection_threshold = self.rejection_threshold;
        cfg.continuity_correction = !self.no_continuity_correction;
        cfg.sample_missingness_limit = self.sample_missingness_limit;
        Ok(cfg)
    }
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    info!("=== GWAS-RS: Full Analysis ===");

    let raw = read_input(&args.input)?;
    let config = args.to_config()?;

    let payload = analyze(&raw, &config)?;
    info!(
        "Tested {} markers: {} significant at {:.1e}",
        payload.associations.len(),
        payload.significant.len(),
        config.significance_threshold
    );

    let json = serde_json::to_string_pretty(&payload)?;
    write_output(&json, args.output.as_deref())
}
