//! The analysis pipeline: parse, QC, summarize, test, rank, project.
//!
//! Each request is a pure function of one matrix and one configuration.
//! Per-marker association work fans out over the rayon pool and fans
//! back in by input index, so the ranked output is deterministic
//! regardless of scheduling. A cancellation token is checked before
//! each marker; a cancelled run returns an error and no partial payload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use gwas_matrix::{
    parse_matrix, GenotypeMatrix, MalformedInputError, ParseOptions, Phenotype, PhenotypeKind,
};

use crate::assoc::result::AssociationResult;
use crate::assoc::{chisq, regression};
use crate::config::AnalysisConfig;
use crate::descriptive::{summarize_markers, MarkerStats};
use crate::qc::{run_qc, QcReport};
use crate::rank::{manhattan_points, qq_points, rank_results, significant, ManhattanPoint, QqPoint};

/// Errors that abort a whole analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no phenotype supplied; the {0:?} engine requires one")]
    MissingPhenotype(PhenotypeKind),

    #[error("phenotype is {found:?} but the configuration declares {declared:?}")]
    PhenotypeKindMismatch {
        declared: PhenotypeKind,
        found: PhenotypeKind,
    },

    #[error("analysis cancelled")]
    Cancelled,
}

/// Cooperative cancellation signal, propagated from the request layer.
/// Cancellation takes effect between markers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything one analysis produces, returned together and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub qc: QcReport,
    pub descriptive: Vec<MarkerStats>,
    /// Ranked association results, exactly one per input marker.
    pub associations: Vec<AssociationResult>,
    /// Marker IDs passing the significance threshold, in ranked order.
    pub significant: Vec<String>,
    pub manhattan: Vec<ManhattanPoint>,
    pub qq: Vec<QqPoint>,
}

/// Run the full pipeline on raw delimited text.
pub fn analyze(raw: &str, config: &AnalysisConfig) -> Result<AnalysisPayload, AnalysisError> {
    analyze_cancellable(raw, config, &CancelToken::new())
}

/// [`analyze`] with an external cancellation token.
pub fn analyze_cancellable(
    raw: &str,
    config: &AnalysisConfig,
    token: &CancelToken,
) -> Result<AnalysisPayload, AnalysisError> {
    config
        .validate()
        .map_err(AnalysisError::InvalidConfig)?;

    let opts = ParseOptions {
        delimiter: config.delimiter,
        phenotype_column: config.phenotype_column.clone(),
        phenotype_kind: Some(config.phenotype_kind),
        rejection_threshold: config.rejection_threshold,
    };
    let matrix = parse_matrix(raw, &opts)?;
    info!(
        samples = matrix.n_samples(),
        markers = matrix.n_markers(),
        "parsed genotype matrix"
    );

    analyze_matrix(&matrix, config, token)
}

/// Run the pipeline on an already-parsed matrix (e.g. one with an
/// externally attached phenotype vector).
pub fn analyze_matrix(
    matrix: &GenotypeMatrix,
    config: &AnalysisConfig,
    token: &CancelToken,
) -> Result<AnalysisPayload, AnalysisError> {
    config
        .validate()
        .map_err(AnalysisError::InvalidConfig)?;

    let qc = run_qc(matrix, config.sample_missingness_limit);
    let descriptive = summarize_markers(matrix);

    let phenotype = matrix
        .phenotype()
        .ok_or(AnalysisError::MissingPhenotype(config.phenotype_kind))?;
    if phenotype.kind() != config.phenotype_kind {
        return Err(AnalysisError::PhenotypeKindMismatch {
            declared: config.phenotype_kind,
            found: phenotype.kind(),
        });
    }

    let results = run_association(matrix, phenotype, config, token)?;
    debug_assert_eq!(results.len(), matrix.n_markers());

    let associations = rank_results(results);
    let significant = significant(&associations, config.significance_threshold);
    let manhattan = manhattan_points(&associations);
    let qq = qq_points(&associations);

    info!(
        tested = associations.len(),
        significant = significant.len(),
        "association testing complete"
    );

    Ok(AnalysisPayload {
        qc,
        descriptive,
        associations,
        significant,
        manhattan,
        qq,
    })
}

/// Fan out one association test per marker over the rayon pool.
fn run_association(
    matrix: &GenotypeMatrix,
    phenotype: &Phenotype,
    config: &AnalysisConfig,
    token: &CancelToken,
) -> Result<Vec<AssociationResult>, AnalysisError> {
    let markers = matrix.markers();
    debug!(markers = markers.len(), "dispatching per-marker tests");

    (0..markers.len())
        .into_par_iter()
        .map(|j| {
            if token.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            let dosages = matrix.marker_column(j);
            let result = match phenotype {
                Phenotype::Categorical(labels) => chisq::test_marker(
                    &markers[j],
                    &dosages,
                    labels,
                    config.continuity_correction,
                ),
                Phenotype::Continuous(values) => {
                    regression::test_marker(&markers[j], &dosages, values)
                }
            };
            Ok(result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorical_csv() -> String {
        let mut raw = String::from("sample,status,1:100,1:200,2:50\n");
        for i in 0..30 {
            // First marker tracks status, the others do not.
            raw.push_str(&format!("case{i},case,{},{},{}\n", 2, i % 3, (i + 1) % 3));
        }
        for i in 0..30 {
            raw.push_str(&format!("ctrl{i},control,{},{},{}\n", 0, i % 3, (i + 2) % 3));
        }
        raw
    }

    fn categorical_config() -> AnalysisConfig {
        let mut cfg = AnalysisConfig::new(PhenotypeKind::Categorical);
        cfg.phenotype_column = Some(gwas_matrix::ColumnRef::Name("status".into()));
        cfg
    }

    #[test]
    fn test_analyze_one_result_per_marker() {
        let payload = analyze(&categorical_csv(), &categorical_config()).unwrap();
        assert_eq!(payload.associations.len(), 3);
        assert_eq!(payload.qq.len(), 3);
        assert_eq!(payload.qc.total_markers, 3);
        assert_eq!(payload.descriptive.len(), 3);
    }

    #[test]
    fn test_analyze_missing_phenotype() {
        let raw = "sample,rs1\nS1,0\nS2,1\nS3,2\n";
        let cfg = AnalysisConfig::new(PhenotypeKind::Categorical);
        let err = analyze(raw, &cfg).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingPhenotype(_)));
    }

    #[test]
    fn test_analyze_invalid_config() {
        let mut cfg = categorical_config();
        cfg.significance_threshold = 2.0;
        let err = analyze(&categorical_csv(), &cfg).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let err = analyze_cancellable(&categorical_csv(), &categorical_config(), &token)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled));
    }

    #[test]
    fn test_external_phenotype_attachment() {
        let raw = "sample,rs1\nS1,0\nS2,1\nS3,2\nS4,0\nS5,2\n";
        let matrix = parse_matrix(raw, &ParseOptions::default())
            .unwrap()
            .with_phenotype(Phenotype::Continuous(vec![3.0, 5.0, 7.0, 3.0, 7.0]))
            .unwrap();
        let cfg = AnalysisConfig::new(PhenotypeKind::Continuous);
        let payload = analyze_matrix(&matrix, &cfg, &CancelToken::new()).unwrap();
        assert_eq!(payload.associations.len(), 1);
        match payload.associations[0].effect.as_ref().unwrap() {
            crate::assoc::result::EffectSize::Beta { beta, .. } => {
                assert!((beta - 2.0).abs() < 1e-10)
            }
            other => panic!("expected beta, got {other:?}"),
        }
    }

    #[test]
    fn test_phenotype_kind_mismatch() {
        let raw = "sample,rs1\nS1,0\nS2,1\nS3,2\n";
        let matrix = parse_matrix(raw, &ParseOptions::default())
            .unwrap()
            .with_phenotype(Phenotype::Continuous(vec![1.0, 2.0, 3.0]))
            .unwrap();
        let cfg = AnalysisConfig::new(PhenotypeKind::Categorical);
        let err = analyze_matrix(&matrix, &cfg, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, AnalysisError::PhenotypeKindMismatch { .. }));
    }
}
