//! Chi-square association test for categorical phenotypes.
//!
//! Per marker: build the observed phenotype-class x genotype-class
//! contingency table, compute Pearson's X^2 against the independence
//! expectation, and take the upper-tail p-value from the chi-square
//! distribution via the log-space regularized upper incomplete gamma.
//! For a two-class phenotype the 2x2 carrier collapse also yields an
//! odds ratio with a 95% CI.

use gwas_matrix::MarkerInfo;

use crate::assoc::result::{AssociationResult, EffectSize, ResultFlags, TestKind};
use crate::util::math::{chi_square_log_survival, neg_log10_from_ln};

/// Expected-count floor below which the asymptotic test is suspect.
const EXPECTED_COUNT_FLOOR: f64 = 5.0;

/// Observed counts for one marker: phenotype classes x genotype
/// classes {0, 1, 2}. Ephemeral; built and discarded per test.
#[derive(Debug)]
pub struct ContingencyTable {
    /// Distinct phenotype labels, sorted for determinism.
    pub labels: Vec<String>,
    /// `counts[r][c]`: samples with phenotype class r and genotype class c.
    pub counts: Vec<[u64; 3]>,
    /// Carrier collapse per phenotype class: (carrier, non-carrier),
    /// where carrier means dosage >= 1.
    pub carrier_counts: Vec<(u64, u64)>,
    /// Samples contributing (non-missing genotype and phenotype).
    pub n_used: usize,
}

impl ContingencyTable {
    /// Build from aligned dosage and label vectors, excluding samples
    /// with either value missing. Dosages are rounded to the nearest
    /// of {0, 1, 2}.
    pub fn build(dosages: &[f64], labels: &[Option<String>]) -> Self {
        debug_assert_eq!(dosages.len(), labels.len());

        let mut classes: Vec<String> = labels
            .iter()
            .zip(dosages.iter())
            .filter(|(l, d)| l.is_some() && !d.is_nan())
            .map(|(l, _)| l.as_deref().unwrap().to_string())
            .collect();
        classes.sort();
        classes.dedup();

        let mut counts = vec![[0u64; 3]; classes.len()];
        let mut carrier_counts = vec![(0u64, 0u64); classes.len()];
        let mut n_used = 0usize;

        for (d, l) in dosages.iter().zip(labels.iter()) {
            let label = match l {
                Some(label) if !d.is_nan() => label,
                _ => continue,
            };
            let r = classes.iter().position(|c| c == label).unwrap();
            let c = d.round().clamp(0.0, 2.0) as usize;
            counts[r][c] += 1;
            if *d >= 0.5 {
                carrier_counts[r].0 += 1;
            } else {
                carrier_counts[r].1 += 1;
            }
            n_used += 1;
        }

        Self {
            labels: classes,
            counts,
            carrier_counts,
            n_used,
        }
    }

    /// Genotype classes with at least one observation.
    fn occupied_columns(&self) -> Vec<usize> {
        (0..3)
            .filter(|&c| self.counts.iter().any(|row| row[c] > 0))
            .collect()
    }
}

/// Pearson chi-square over the table. Returns
/// `(statistic, df, low_expected)` or `None` for a degenerate table.
fn pearson_chi_square(table: &ContingencyTable) -> Option<(f64, usize, bool)> {
    let cols = table.occupied_columns();
    let rows = table.labels.len();
    if rows < 2 || cols.len() < 2 {
        return None;
    }

    let row_totals: Vec<u64> = table.counts.iter().map(|r| r.iter().sum()).collect();
    let col_totals: Vec<u64> = cols
        .iter()
        .map(|&c| table.counts.iter().map(|r| r[c]).sum())
        .collect();
    let grand: u64 = row_totals.iter().sum();
    if grand == 0 {
        return None;
    }

    let mut x2 = 0.0;
    let mut low_expected = false;
    for (i, &rt) in row_totals.iter().enumerate() {
        for (k, &c) in cols.iter().enumerate() {
            let expected = rt as f64 * col_totals[k] as f64 / grand as f64;
            if expected == 0.0 {
                // Unreachable once empty rows/columns are dropped, but
                // a zero expectation must never divide.
                return None;
            }
            if expected < EXPECTED_COUNT_FLOOR {
                low_expected = true;
            }
            let observed = table.counts[i][c] as f64;
            x2 += (observed - expected).powi(2) / expected;
        }
    }

    let df = (rows - 1) * (cols.len() - 1);
    Some((x2, df, low_expected))
}

/// Odds ratio from the 2x2 carrier collapse of a two-class table.
///
/// Returns `(effect, continuity_corrected)`; `None` when the phenotype
/// has more than two classes, or a zero cell exists and correction is
/// disabled.
fn odds_ratio(
    table: &ContingencyTable,
    continuity_correction: bool,
) -> (Option<EffectSize>, bool) {
    if table.labels.len() != 2 {
        return (None, false);
    }
    let (a, b) = table.carrier_counts[0];
    let (c, d) = table.carrier_counts[1];

    let has_zero = a == 0 || b == 0 || c == 0 || d == 0;
    let (a, b, c, d) = if has_zero {
        if !continuity_correction {
            return (None, false);
        }
        (
            a as f64 + 0.5,
            b as f64 + 0.5,
            c as f64 + 0.5,
            d as f64 + 0.5,
        )
    } else {
        (a as f64, b as f64, c as f64, d as f64)
    };

    let or = (a * d) / (b * c);
    let se = (1.0 / a + 1.0 / b + 1.0 / c + 1.0 / d).sqrt();
    let log_or = or.ln();
    let effect = EffectSize::OddsRatio {
        or,
        ci_low: (log_or - 1.96 * se).exp(),
        ci_high: (log_or + 1.96 * se).exp(),
    };
    (Some(effect), has_zero)
}

/// Run the chi-square test for one marker.
pub fn test_marker(
    marker: &MarkerInfo,
    dosages: &[f64],
    labels: &[Option<String>],
    continuity_correction: bool,
) -> AssociationResult {
    let table = ContingencyTable::build(dosages, labels);
    let n_used = table.n_used;

    let (x2, df, low_expected) = match pearson_chi_square(&table) {
        Some(t) => t,
        None => {
            return AssociationResult::undefined(
                marker.id.clone(),
                marker.chrom.clone(),
                marker.pos,
                TestKind::ChiSquare,
                n_used,
                ResultFlags {
                    degenerate_table: true,
                    ..ResultFlags::default()
                },
            );
        }
    };

    let ln_p = chi_square_log_survival(x2, df);
    let neg_log10_p = neg_log10_from_ln(ln_p);
    let p_raw = ln_p.exp();
    let precision_limited = p_raw == 0.0;
    let p_value = if precision_limited {
        f64::MIN_POSITIVE
    } else {
        p_raw.min(1.0)
    };

    let (effect, continuity_corrected) = odds_ratio(&table, continuity_correction);

    AssociationResult {
        marker_id: marker.id.clone(),
        chrom: marker.chrom.clone(),
        pos: marker.pos,
        p_value,
        neg_log10_p,
        statistic: x2,
        effect,
        test_kind: TestKind::ChiSquare,
        n_used,
        flags: ResultFlags {
            degenerate_table: false,
            insufficient_samples: false,
            low_expected_count: low_expected,
            continuity_corrected,
            precision_limited,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: &str) -> MarkerInfo {
        MarkerInfo::from_header_token(id)
    }

    fn labelled(label: &str, n: usize) -> Vec<Option<String>> {
        vec![Some(label.to_string()); n]
    }

    /// Worked 2x2 example: carrier counts [[50,10],[10,50]].
    fn worked_example() -> (Vec<f64>, Vec<Option<String>>) {
        let mut dosages = Vec::new();
        let mut labels = Vec::new();
        // 60 cases: 50 carriers, 10 non-carriers.
        dosages.extend(std::iter::repeat(1.0).take(50));
        dosages.extend(std::iter::repeat(0.0).take(10));
        labels.extend(labelled("case", 60));
        // 60 controls: 10 carriers, 50 non-carriers.
        dosages.extend(std::iter::repeat(1.0).take(10));
        dosages.extend(std::iter::repeat(0.0).take(50));
        labels.extend(labelled("control", 60));
        (dosages, labels)
    }

    #[test]
    fn test_worked_example_statistic_and_pvalue() {
        let (dosages, labels) = worked_example();
        let r = test_marker(&marker("1:100"), &dosages, &labels, true);
        // Pearson on [[50,10],[10,50]]: all E = 30, X^2 = 4 * 400/30.
        assert!((r.statistic - 160.0 / 3.0).abs() < 1e-9, "X2={}", r.statistic);
        assert!(r.p_value < 1e-11, "p={}", r.p_value);
        assert!(!r.flags.degenerate_table);
        assert!(!r.flags.low_expected_count);
        assert_eq!(r.n_used, 120);
    }

    #[test]
    fn test_worked_example_odds_ratio() {
        let (dosages, labels) = worked_example();
        let r = test_marker(&marker("1:100"), &dosages, &labels, true);
        match r.effect.unwrap() {
            EffectSize::OddsRatio { or, ci_low, ci_high } => {
                assert!((or - 25.0).abs() < 1e-9);
                // SE(log OR) = sqrt(1/50+1/10+1/10+1/50) = sqrt(0.24)
                let se = 0.24_f64.sqrt();
                assert!((ci_low - (25.0_f64.ln() - 1.96 * se).exp()).abs() < 1e-9);
                assert!((ci_high - (25.0_f64.ln() + 1.96 * se).exp()).abs() < 1e-9);
            }
            other => panic!("expected odds ratio, got {other:?}"),
        }
        assert!(!r.flags.continuity_corrected);
    }

    #[test]
    fn test_independent_table_not_significant() {
        // Identical genotype distribution in both classes.
        let mut dosages = Vec::new();
        let mut labels = Vec::new();
        for class in ["case", "control"] {
            for d in [0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 0.0, 1.0, 2.0, 1.0] {
                dosages.push(d);
                labels.push(Some(class.to_string()));
            }
        }
        let r = test_marker(&marker("rs1"), &dosages, &labels, true);
        assert!(r.statistic.abs() < 1e-9);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_is_degenerate() {
        let dosages = vec![0.0, 1.0, 2.0, 1.0];
        let labels = labelled("case", 4);
        let r = test_marker(&marker("rs1"), &dosages, &labels, true);
        assert!(r.flags.degenerate_table);
        assert!(r.p_value.is_nan());
        assert!(r.statistic.is_nan());
    }

    #[test]
    fn test_monomorphic_marker_is_degenerate() {
        // One occupied genotype column.
        let dosages = vec![0.0, 0.0, 0.0, 0.0];
        let mut labels = labelled("case", 2);
        labels.extend(labelled("control", 2));
        let r = test_marker(&marker("rs1"), &dosages, &labels, true);
        assert!(r.flags.degenerate_table);
    }

    #[test]
    fn test_low_expected_count_flagged_not_dropped() {
        let dosages = vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0];
        let mut labels = labelled("case", 3);
        labels.extend(labelled("control", 3));
        let r = test_marker(&marker("rs1"), &dosages, &labels, true);
        assert!(r.flags.low_expected_count);
        assert!(!r.flags.degenerate_table);
        assert!(r.p_value > 0.0 && r.p_value <= 1.0);
    }

    #[test]
    fn test_zero_cell_continuity_correction() {
        // All cases are carriers: a=4, b=0, c=1, d=3.
        let dosages = vec![1.0, 1.0, 2.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let mut labels = labelled("case", 4);
        labels.extend(labelled("control", 4));

        let corrected = test_marker(&marker("rs1"), &dosages, &labels, true);
        assert!(corrected.flags.continuity_corrected);
        match corrected.effect.unwrap() {
            EffectSize::OddsRatio { or, .. } => {
                // (4.5 * 3.5) / (0.5 * 1.5)
                assert!((or - 21.0).abs() < 1e-9, "or={or}");
            }
            other => panic!("expected odds ratio, got {other:?}"),
        }

        let uncorrected = test_marker(&marker("rs1"), &dosages, &labels, false);
        assert_eq!(uncorrected.effect, None);
        assert!(!uncorrected.flags.continuity_corrected);
    }

    #[test]
    fn test_missing_values_excluded() {
        let dosages = vec![f64::NAN, 1.0, 0.0, 1.0, 0.0, 1.0];
        let labels = vec![
            Some("case".to_string()),
            None,
            Some("case".to_string()),
            Some("case".to_string()),
            Some("control".to_string()),
            Some("control".to_string()),
        ];
        let r = test_marker(&marker("rs1"), &dosages, &labels, true);
        assert_eq!(r.n_used, 4);
    }

    #[test]
    fn test_three_class_phenotype_no_odds_ratio() {
        let mut dosages = Vec::new();
        let mut labels = Vec::new();
        for class in ["low", "mid", "high"] {
            for d in [0.0, 1.0, 2.0, 1.0] {
                dosages.push(d);
                labels.push(Some(class.to_string()));
            }
        }
        let r = test_marker(&marker("rs1"), &dosages, &labels, true);
        assert_eq!(r.effect, None);
        assert!(!r.flags.degenerate_table);
    }
}
