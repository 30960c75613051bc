//! Per-marker descriptive statistics.

use serde::{Deserialize, Serialize};

use gwas_matrix::GenotypeMatrix;

/// Mean, spread, and frequency summary for one marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerStats {
    pub marker_id: String,
    /// Mean dosage over non-missing values; NaN when every value is
    /// missing, serialized as JSON null.
    #[serde(with = "crate::util::json::nan_as_null")]
    pub mean: f64,
    /// Bessel-corrected sample standard deviation (denominator n-1).
    /// `None` when fewer than 2 non-missing values.
    pub std_dev: Option<f64>,
    /// Minor allele frequency; NaN when every value is missing,
    /// serialized as JSON null.
    #[serde(with = "crate::util::json::nan_as_null")]
    pub maf: f64,
    /// Count of non-missing values.
    pub n_non_missing: usize,
}

/// Summarize every marker. Pure, O(samples x markers).
pub fn summarize_markers(matrix: &GenotypeMatrix) -> Vec<MarkerStats> {
    (0..matrix.n_markers())
        .map(|j| {
            let column = matrix.marker_column(j);
            let values: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
            let n = values.len();

            let mean = if n == 0 {
                f64::NAN
            } else {
                values.iter().sum::<f64>() / n as f64
            };

            let std_dev = if n < 2 {
                None
            } else {
                let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
                Some((ss / (n - 1) as f64).sqrt())
            };

            MarkerStats {
                marker_id: matrix.markers()[j].id.clone(),
                mean,
                std_dev,
                maf: matrix.maf(j),
                n_non_missing: n,
            }
        })
        .collect()
}
