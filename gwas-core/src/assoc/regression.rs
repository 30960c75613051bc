//! Simple OLS association test for continuous phenotypes.
//!
//! Per marker: fit phenotype ~ intercept + dosage over samples with
//! both values present. Reports the slope (beta), its standard error,
//! and a two-tailed p-value from Student's t with n-2 degrees of
//! freedom. Markers with fewer than 3 usable samples or no genotype
//! variance are flagged, not fitted.

use statrs::distribution::{ContinuousCDF, StudentsT};

use gwas_matrix::MarkerInfo;

use crate::assoc::result::{AssociationResult, EffectSize, ResultFlags, TestKind};

/// Run the regression test for one marker.
pub fn test_marker(marker: &MarkerInfo, dosages: &[f64], phenotype: &[f64]) -> AssociationResult {
    debug_assert_eq!(dosages.len(), phenotype.len());

    let pairs: Vec<(f64, f64)> = dosages
        .iter()
        .zip(phenotype.iter())
        .filter(|(g, y)| !g.is_nan() && !y.is_nan())
        .map(|(&g, &y)| (g, y))
        .collect();
    let n = pairs.len();

    if n < 3 {
        return insufficient(marker, n);
    }

    let nf = n as f64;
    let mean_g = pairs.iter().map(|(g, _)| g).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for &(g, y) in &pairs {
        let dg = g - mean_g;
        let dy = y - mean_y;
        sxx += dg * dg;
        sxy += dg * dy;
        syy += dy * dy;
    }

    if sxx <= 0.0 {
        // Monomorphic marker: the slope is unidentifiable.
        return insufficient(marker, n);
    }

    let beta = sxy / sxx;
    let df = nf - 2.0;
    // Residual sum of squares; rounding can push an exact fit slightly
    // negative.
    let sse = (syy - beta * sxy).max(0.0);
    let sigma2 = sse / df;
    let se = (sigma2 / sxx).sqrt();

    let (p_value, neg_log10_p, precision_limited) = if se > 0.0 {
        let t = beta / se;
        let dist = StudentsT::new(0.0, 1.0, df).unwrap();
        let p = 2.0 * (1.0 - dist.cdf(t.abs()));
        if p > 0.0 {
            (p.min(1.0), -p.min(1.0).log10(), false)
        } else {
            (f64::MIN_POSITIVE, -f64::MIN_POSITIVE.log10(), true)
        }
    } else if beta.abs() > 0.0 {
        // Exact fit: residual variance is zero and the slope is real.
        (f64::MIN_POSITIVE, -f64::MIN_POSITIVE.log10(), true)
    } else {
        // Constant phenotype: nothing to explain.
        (1.0, 0.0, false)
    };

    let statistic = if se > 0.0 {
        beta / se
    } else if beta.abs() > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    AssociationResult {
        marker_id: marker.id.clone(),
        chrom: marker.chrom.clone(),
        pos: marker.pos,
        p_value,
        neg_log10_p,
        statistic,
        effect: Some(EffectSize::Beta { beta, se }),
        test_kind: TestKind::LinearRegression,
        n_used: n,
        flags: ResultFlags {
            precision_limited,
            ..ResultFlags::default()
        },
    }
}

fn insufficient(marker: &MarkerInfo, n_used: usize) -> AssociationResult {
    AssociationResult::undefined(
        marker.id.clone(),
        marker.chrom.clone(),
        marker.pos,
        TestKind::LinearRegression,
        n_used,
        ResultFlags {
            insufficient_samples: true,
            ..ResultFlags::default()
        },
    )
}
