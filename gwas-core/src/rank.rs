//! Ranking, significance selection, and Manhattan/QQ projection.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::assoc::result::AssociationResult;
use crate::util::math::chrom_sort_key;

/// One Manhattan plot coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManhattanPoint {
    pub chrom: String,
    pub pos: u64,
    pub neg_log10_p: f64,
}

/// One QQ plot coordinate: expected vs observed -log10(p).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QqPoint {
    pub expected: f64,
    pub observed: f64,
}

/// Total order over results: ascending p-value, undefined (NaN) last;
/// ties broken by chromosome (numeric ascending, then lexical, missing
/// last), then position (missing last), then marker id.
fn compare_results(a: &AssociationResult, b: &AssociationResult) -> Ordering {
    match (a.p_value.is_nan(), b.p_value.is_nan()) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    if !a.p_value.is_nan() {
        match a.p_value.partial_cmp(&b.p_value).unwrap_or(Ordering::Equal) {
            Ordering::Equal => {}
            ord => return ord,
        }
        // Clamped p-values compare equal; the log-space value still
        // discriminates. More significant (larger) first.
        match b
            .neg_log10_p
            .partial_cmp(&a.neg_log10_p)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => {}
            ord => return ord,
        }
    }
    let chrom_ord =
        chrom_sort_key(a.chrom.as_deref()).cmp(&chrom_sort_key(b.chrom.as_deref()));
    if chrom_ord != Ordering::Equal {
        return chrom_ord;
    }
    let pos_ord = match (a.pos, b.pos) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    if pos_ord != Ordering::Equal {
        return pos_ord;
    }
    a.marker_id.cmp(&b.marker_id)
}

/// Sort results into the deterministic ranked order.
pub fn rank_results(mut results: Vec<AssociationResult>) -> Vec<AssociationResult> {
    results.sort_by(compare_results);
    results
}

/// Marker IDs with `p <= threshold`, excluding undefined results.
/// Assumes ranked input; output preserves that order.
pub fn significant(results: &[AssociationResult], threshold: f64) -> Vec<String> {
    results
        .iter()
        .filter(|r| !r.flags.is_undefined() && r.p_value <= threshold)
        .map(|r| r.marker_id.clone())
        .collect()
}

/// Manhattan projection: every result with both chromosome and
/// position; results without coordinates are omitted from this
/// projection only.
pub fn manhattan_points(results: &[AssociationResult]) -> Vec<ManhattanPoint> {
    results
        .iter()
        .filter_map(|r| match (&r.chrom, r.pos) {
            (Some(chrom), Some(pos)) => Some(ManhattanPoint {
                chrom: chrom.clone(),
                pos,
                neg_log10_p: if r.neg_log10_p.is_nan() {
                    0.0
                } else {
                    r.neg_log10_p
                },
            }),
            _ => None,
        })
        .collect()
}

/// QQ projection: observed -log10(p) sorted ascending, paired with the
/// uniform-null expectation -log10(rank/(n+1)) in the same ordering.
/// Markers without a finite p contribute observed 0 (p = 1), so the
/// projection always has exactly one point per marker.
pub fn qq_points(results: &[AssociationResult]) -> Vec<QqPoint> {
    let n = results.len();
    let mut observed: Vec<f64> = results
        .iter()
        .map(|r| {
            if r.neg_log10_p.is_finite() {
                r.neg_log10_p
            } else {
                0.0
            }
        })
        .collect();
    observed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    observed
        .into_iter()
        .enumerate()
        .map(|(i, obs)| {
            // The i-th smallest observed value pairs with rank n - i
            // from the top of the null distribution.
            let rank = (n - i) as f64;
            QqPoint {
                expected: -(rank / (n as f64 + 1.0)).log10(),
                observed: obs,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assoc::result::{ResultFlags, TestKind};

    fn result(id: &str, chrom: Option<&str>, pos: Option<u64>, p: f64) -> AssociationResult {
        AssociationResult {
            marker_id: id.to_string(),
            chrom: chrom.map(|c| c.to_string()),
            pos,
            p_value: p,
            neg_log10_p: if p.is_nan() { f64::NAN } else { -p.log10() },
            statistic: 0.0,
            effect: None,
            test_kind: TestKind::ChiSquare,
            n_used: 10,
            flags: if p.is_nan() {
                ResultFlags {
                    degenerate_table: true,
                    ..ResultFlags::default()
                }
            } else {
                ResultFlags::default()
            },
        }
    }

    #[test]
    fn test_rank_ascending_p_nan_last() {
        let ranked = rank_results(vec![
            result("a", Some("1"), Some(1), 0.5),
            result("b", Some("1"), Some(2), f64::NAN),
            result("c", Some("1"), Some(3), 1e-9),
            result("d", Some("1"), Some(4), 0.01),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|r| r.marker_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_rank_ties_by_chrom_then_pos() {
        let ranked = rank_results(vec![
            result("a", Some("X"), Some(5), 0.01),
            result("b", Some("2"), Some(9), 0.01),
            result("c", Some("2"), Some(3), 0.01),
            result("d", Some("10"), Some(1), 0.01),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|r| r.marker_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn test_significant_excludes_undefined() {
        let ranked = rank_results(vec![
            result("a", Some("1"), Some(1), 1e-10),
            result("b", Some("1"), Some(2), f64::NAN),
            result("c", Some("1"), Some(3), 0.5),
        ]);
        assert_eq!(significant(&ranked, 5e-8), vec!["a"]);
    }

    #[test]
    fn test_manhattan_omits_missing_coordinates() {
        let results = vec![
            result("a", Some("1"), Some(100), 0.01),
            result("b", None, None, 0.001),
            result("c", Some("2"), None, 0.001),
        ];
        let points = manhattan_points(&results);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].chrom, "1");
        assert_eq!(points[0].pos, 100);
        assert!((points[0].neg_log10_p - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_qq_one_point_per_marker() {
        let results = vec![
            result("a", Some("1"), Some(1), 0.5),
            result("b", Some("1"), Some(2), f64::NAN),
            result("c", Some("1"), Some(3), 0.01),
        ];
        let qq = qq_points(&results);
        assert_eq!(qq.len(), 3);
        // Observed ascending; degenerate marker contributes 0.
        assert_eq!(qq[0].observed, 0.0);
        assert!(qq[1].observed < qq[2].observed);
        // Expected ascending too, topping out at -log10(1/(n+1)).
        assert!(qq[0].expected < qq[2].expected);
        assert!((qq[2].expected - (4.0_f64).log10()).abs() < 1e-12);
    }

    #[test]
    fn test_qq_uniform_null_diagonal() {
        // p_i = i/(n+1) exactly: observed equals expected at each point.
        let n = 9;
        let results: Vec<AssociationResult> = (1..=n)
            .map(|i| {
                result(
                    &format!("m{i}"),
                    Some("1"),
                    Some(i as u64),
                    i as f64 / (n as f64 + 1.0),
                )
            })
            .collect();
        for point in qq_points(&results) {
            assert!(
                (point.expected - point.observed).abs() < 1e-12,
                "expected {} observed {}",
                point.expected,
                point.observed
            );
        }
    }
}
