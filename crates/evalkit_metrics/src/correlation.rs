//! Pearson and Spearman correlation coefficients with two-sided p-values.

use ndarray::{Array1, ArrayD};

use evalkit_core::{Metrics, Result};

use crate::args::MetricArgs;
use crate::nan::preprocess_pair;
use crate::special::{average_ranks, student_t_two_sided_pvalue};

/// `(coefficient, p-value)` of the linear correlation of `x` and `y`.
fn pearson(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len();
    if n < 2 {
        return (f64::NAN, f64::NAN);
    }
    let mean = |v: &[f64]| v.iter().sum::<f64>() / n as f64;
    let (mx, my) = (mean(x), mean(y));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    if n == 2 {
        return (r, 1.0);
    }
    let df = (n - 2) as f64;
    let pvalue = if r.abs() == 1.0 {
        0.0
    } else {
        student_t_two_sided_pvalue(r * (df / (1.0 - r * r)).sqrt(), df)
    };
    (r, pvalue)
}

fn correlation(
    x: &ArrayD<f64>,
    y: &ArrayD<f64>,
    name: &str,
    args: &MetricArgs,
    transform: fn(&Array1<f64>) -> Vec<f64>,
) -> Result<Metrics> {
    let paired = preprocess_pair(("x", "y"), x, y, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    let (coeff, pvalue) = if paired.is_degenerate() {
        (f64::NAN, f64::NAN)
    } else {
        pearson(&transform(&paired.lhs), &transform(&paired.rhs))
    };
    metrics.insert(format!("{name}_coeff"), coeff);
    metrics.insert(format!("{name}_pvalue"), pvalue);
    Ok(args.decorate(metrics))
}

/// Pearson correlation: `{count, pearson_coeff, pearson_pvalue}`.
///
/// ```rust
/// use evalkit_metrics::{pearsonr, MetricArgs};
/// use ndarray::array;
///
/// let metrics = pearsonr(
///     &array![1.0, 2.0, 3.0, 4.0, 5.0].into_dyn(),
///     &array![2.0, 4.0, 6.0, 8.0, 10.0].into_dyn(),
///     &MetricArgs::new(),
/// )
/// .unwrap();
/// assert_eq!(metrics.scalar("pearson_coeff"), Some(1.0));
/// assert_eq!(metrics.scalar("pearson_pvalue"), Some(0.0));
/// ```
pub fn pearsonr(x: &ArrayD<f64>, y: &ArrayD<f64>, args: &MetricArgs) -> Result<Metrics> {
    correlation(x, y, "pearson", args, |v| v.to_vec())
}

/// Spearman rank correlation: `{count, spearman_coeff, spearman_pvalue}`.
/// Ties receive their average rank.
pub fn spearmanr(x: &ArrayD<f64>, y: &ArrayD<f64>, args: &MetricArgs) -> Result<Metrics> {
    correlation(x, y, "spearman", args, |v| average_ranks(&v.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use evalkit_core::NanPolicy;
    use ndarray::array;

    #[test]
    fn test_pearsonr_negative() {
        let out = pearsonr(
            &array![1.0, 2.0, 3.0, 4.0, 5.0].into_dyn(),
            &array![5.0, 4.0, 3.0, 2.0, 1.0].into_dyn(),
            &MetricArgs::new(),
        )
        .unwrap();
        assert_eq!(out.scalar("pearson_coeff"), Some(-1.0));
        assert_eq!(out.scalar("pearson_pvalue"), Some(0.0));
    }

    #[test]
    fn test_pearsonr_partial() {
        // r = 0.8 with n = 5 gives t = 0.8 * sqrt(3 / 0.36).
        let out = pearsonr(
            &array![1.0, 2.0, 3.0, 4.0, 5.0].into_dyn(),
            &array![2.0, 1.0, 4.0, 3.0, 5.0].into_dyn(),
            &MetricArgs::new(),
        )
        .unwrap();
        assert_abs_diff_eq!(out.scalar("pearson_coeff").unwrap(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(
            out.scalar("pearson_pvalue").unwrap(),
            0.10408803866182788,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_pearsonr_two_samples() {
        let out = pearsonr(
            &array![1.0, 2.0].into_dyn(),
            &array![3.0, 1.0].into_dyn(),
            &MetricArgs::new(),
        )
        .unwrap();
        assert_eq!(out.scalar("pearson_coeff"), Some(-1.0));
        assert_eq!(out.scalar("pearson_pvalue"), Some(1.0));
    }

    #[test]
    fn test_pearsonr_constant() {
        let out = pearsonr(
            &array![1.0, 1.0, 1.0].into_dyn(),
            &array![1.0, 2.0, 3.0].into_dyn(),
            &MetricArgs::new(),
        )
        .unwrap();
        assert!(out.scalar("pearson_coeff").unwrap().is_nan());
    }

    #[test]
    fn test_spearmanr_monotonic() {
        let out = spearmanr(
            &array![1.0, 2.0, 3.0, 4.0, 5.0].into_dyn(),
            &array![1.0, 4.0, 9.0, 16.0, 100.0].into_dyn(),
            &MetricArgs::new(),
        )
        .unwrap();
        assert_eq!(out.count("count"), Some(5));
        assert_eq!(out.scalar("spearman_coeff"), Some(1.0));
        assert_eq!(out.scalar("spearman_pvalue"), Some(0.0));
    }

    #[test]
    fn test_spearmanr_nan_omit() {
        let out = spearmanr(
            &array![1.0, 2.0, f64::NAN, 4.0, 5.0].into_dyn(),
            &array![1.0, 4.0, 9.0, 16.0, f64::NAN].into_dyn(),
            &MetricArgs::new().with_nan_policy(NanPolicy::Omit),
        )
        .unwrap();
        assert_eq!(out.count("count"), Some(3));
        assert_eq!(out.scalar("spearman_coeff"), Some(1.0));
    }

    #[test]
    fn test_spearmanr_empty() {
        let e = ArrayD::<f64>::zeros(ndarray::IxDyn(&[0]));
        let out = spearmanr(&e, &e, &MetricArgs::new()).unwrap();
        assert_eq!(out.count("count"), Some(0));
        assert!(out.scalar("spearman_pvalue").unwrap().is_nan());
    }
}
