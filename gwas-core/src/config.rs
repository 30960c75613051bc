//! Analysis configuration.
//!
//! One typed structure with named fields, validated once at the
//! component boundary. The request layer's loose key/value options map
//! onto this struct before any computation starts.

use serde::{Deserialize, Serialize};

use gwas_matrix::{ColumnRef, PhenotypeKind};

/// Configuration for one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Column separator byte for the raw upload (b',' for CSV).
    pub delimiter: u8,
    /// Declared phenotype type; selects the association engine.
    pub phenotype_kind: PhenotypeKind,
    /// Phenotype column within the upload, if embedded. When `None`,
    /// the phenotype must be attached to the matrix by the caller.
    pub phenotype_column: Option<ColumnRef>,
    /// Significance threshold for ranked selection, in (0, 1].
    pub significance_threshold: f64,
    /// Maximum tolerated fraction of unparseable genotype cells, in [0, 1].
    pub rejection_threshold: f64,
    /// Whether to apply the 0.5 continuity correction to zero-cell
    /// 2x2 tables when computing odds ratios.
    pub continuity_correction: bool,
    /// Per-sample missingness fraction above which a sample is listed
    /// in the QC report. Listing only; exclusion is the caller's call.
    pub sample_missingness_limit: f64,
}

impl AnalysisConfig {
    /// A config with conventional defaults for the given phenotype kind.
    pub fn new(phenotype_kind: PhenotypeKind) -> Self {
        Self {
            delimiter: b',',
            phenotype_kind,
            phenotype_column: None,
            significance_threshold: 5e-8,
            rejection_threshold: 0.2,
            continuity_correction: true,
            sample_missingness_limit: 0.1,
        }
    }

    /// Validate field ranges. Called once by the pipeline before any
    /// parsing or computation.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_threshold > 0.0 && self.significance_threshold <= 1.0) {
            return Err(format!(
                "significance_threshold must be in (0, 1], got {}",
                self.significance_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.rejection_threshold) {
            return Err(format!(
                "rejection_threshold must be in [0, 1], got {}",
                self.rejection_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.sample_missingness_limit) {
            return Err(format!(
                "sample_missingness_limit must be in [0, 1], got {}",
                self.sample_missingness_limit
            ));
        }
        Ok(())
    }
}
