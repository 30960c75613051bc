//! The per-marker association result record.

use serde::{Deserialize, Serialize};

/// Which test produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    ChiSquare,
    LinearRegression,
}

/// Effect size with its uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSize {
    /// Odds ratio from the 2x2 carrier collapse, with a 95% CI.
    OddsRatio { or: f64, ci_low: f64, ci_high: f64 },
    /// Regression slope with its standard error.
    Beta { beta: f64, se: f64 },
}

/// Non-fatal per-marker conditions, surfaced in the record itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFlags {
    /// Contingency table mathematically undefined (empty rows/columns,
    /// zero degrees of freedom); statistic is NaN.
    pub degenerate_table: bool,
    /// Fewer than 3 usable samples, or zero genotype variance; no fit.
    pub insufficient_samples: bool,
    /// Some expected cell fell below the 5-count validity floor.
    pub low_expected_count: bool,
    /// The 0.5 continuity correction was applied before the odds ratio.
    pub continuity_corrected: bool,
    /// p underflowed f64; `neg_log10_p` carries the exact log-space value.
    pub precision_limited: bool,
}

impl ResultFlags {
    /// True when the marker has no valid test statistic at all and is
    /// excluded from significance ranking.
    pub fn is_undefined(&self) -> bool {
        self.degenerate_table || self.insufficient_samples
    }
}

/// Association result for one marker. Immutable once computed.
///
/// Undefined markers carry NaN statistics; those fields serialize as
/// JSON null and deserialize back to NaN, so a payload with flagged
/// markers still round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationResult {
    pub marker_id: String,
    pub chrom: Option<String>,
    pub pos: Option<u64>,
    /// Upper-tail p-value; NaN iff the flags mark the marker undefined.
    #[serde(with = "crate::util::json::nan_as_null")]
    pub p_value: f64,
    /// -log10(p), computed in log space; exact even when `p_value`
    /// was clamped at the f64 floor.
    #[serde(with = "crate::util::json::nan_as_null")]
    pub neg_log10_p: f64,
    /// Chi-square statistic or t statistic, depending on `test_kind`.
    #[serde(with = "crate::util::json::nan_as_null")]
    pub statistic: f64,
    pub effect: Option<EffectSize>,
    pub test_kind: TestKind,
    /// Samples with both genotype and phenotype present for this marker.
    pub n_used: usize,
    pub flags: ResultFlags,
}

impl AssociationResult {
    /// An undefined result placeholder sharing the common fields.
    pub fn undefined(
        marker_id: String,
        chrom: Option<String>,
        pos: Option<u64>,
        test_kind: TestKind,
        n_used: usize,
        flags: ResultFlags,
    ) -> Self {
        Self {
            marker_id,
            chrom,
            pos,
            p_value: f64::NAN,
            neg_log10_p: f64::NAN,
            statistic: f64::NAN,
            effect: None,
            test_kind,
            n_used,
            flags,
        }
    }
}
