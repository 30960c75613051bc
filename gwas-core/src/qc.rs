//! Quality-control metrics over a parsed genotype matrix.
//!
//! Pure and O(samples x markers). Flags samples above the missingness
//! limit but never excludes them; exclusion is a caller decision.

use serde::{Deserialize, Serialize};

use gwas_matrix::GenotypeMatrix;

/// Per-sample missingness entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMissingness {
    pub sample_id: String,
    /// Fraction of this sample's genotype cells that are missing.
    pub fraction: f64,
}

/// Quality-control report for one matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcReport {
    pub total_samples: usize,
    pub total_markers: usize,
    /// Missing genotype cells / (samples x markers); 0 for an empty matrix.
    pub missing_data_rate: f64,
    /// Per-sample missingness, in sample order.
    pub sample_missingness: Vec<SampleMissingness>,
    /// Sample IDs whose missingness exceeds the configured limit.
    pub high_missingness_samples: Vec<String>,
}

/// Compute the QC report. `missingness_limit` drives only the flag list.
pub fn run_qc(matrix: &GenotypeMatrix, missingness_limit: f64) -> QcReport {
    let total_samples = matrix.n_samples();
    let total_markers = matrix.n_markers();
    let total_cells = total_samples * total_markers;

    let missing_data_rate = if total_cells == 0 {
        0.0
    } else {
        matrix.missing_cell_count() as f64 / total_cells as f64
    };

    let fractions = matrix.sample_missing_fractions();
    let sample_missingness: Vec<SampleMissingness> = matrix
        .sample_ids()
        .iter()
        .zip(fractions.iter())
        .map(|(id, &fraction)| SampleMissingness {
            sample_id: id.clone(),
            fraction,
        })
        .collect();

    let high_missingness_samples = sample_missingness
        .iter()
        .filter(|s| s.fraction > missingness_limit)
        .map(|s| s.sample_id.clone())
        .collect();

    QcReport {
        total_samples,
        total_markers,
        missing_data_rate,
        sample_missingness,
        high_missingness_samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwas_matrix::{parse_matrix, ParseOptions};

    #[test]
    fn test_qc_exact_rate() {
        let raw = "sample,rs1,rs2\nS1,0,NA\nS2,1,2\nS3,NA,NA\n";
        let m = parse_matrix(raw, &ParseOptions::default()).unwrap();
        let qc = run_qc(&m, 0.5);
        assert_eq!(qc.total_samples, 3);
        assert_eq!(qc.total_markers, 2);
        assert!((qc.missing_data_rate - 3.0 / 6.0).abs() < 1e-15);
        assert_eq!(qc.sample_missingness[0].fraction, 0.5);
        // Only S3 is strictly above the 0.5 limit.
        assert_eq!(qc.high_missingness_samples, vec!["S3"]);
    }

    #[test]
    fn test_qc_rate_bounds() {
        let raw = "sample,rs1\nS1,0\nS2,1\n";
        let m = parse_matrix(raw, &ParseOptions::default()).unwrap();
        let qc = run_qc(&m, 0.1);
        assert_eq!(qc.missing_data_rate, 0.0);
        assert!(qc.high_missingness_samples.is_empty());
    }
}
