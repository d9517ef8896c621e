//! Distances between the empirical CDFs of two samples.

use ndarray::{Array1, ArrayD};

use evalkit_core::{Metrics, Result};

use crate::args::MetricArgs;
use crate::nan::preprocess_pair;

fn sorted(values: &Array1<f64>) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

/// Fraction of `sorted` values lower than or equal to `x`.
fn cdf_at(sorted: &[f64], x: f64) -> f64 {
    sorted.partition_point(|v| *v <= x) as f64 / sorted.len() as f64
}

/// Integral of `|U - V|^order` between consecutive pooled values.
fn cdf_integral(u: &Array1<f64>, v: &Array1<f64>, order: i32) -> f64 {
    let (u, v) = (sorted(u), sorted(v));
    let mut pooled: Vec<f64> = u.iter().chain(v.iter()).copied().collect();
    pooled.sort_by(f64::total_cmp);
    pooled
        .windows(2)
        .map(|w| (cdf_at(&u, w[0]) - cdf_at(&v, w[0])).abs().powi(order) * (w[1] - w[0]))
        .sum()
}

fn distance(
    u_values: &ArrayD<f64>,
    v_values: &ArrayD<f64>,
    name: &str,
    args: &MetricArgs,
    statistic: fn(&Array1<f64>, &Array1<f64>) -> f64,
) -> Result<Metrics> {
    let paired = preprocess_pair(("u_values", "v_values"), u_values, v_values, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    let value = if paired.is_degenerate() {
        f64::NAN
    } else {
        statistic(&paired.lhs, &paired.rhs)
    };
    metrics.insert(name, value);
    Ok(args.decorate(metrics))
}

/// First Wasserstein distance between two equally-shaped samples.
///
/// ```rust
/// use evalkit_metrics::{wasserstein_distance, MetricArgs};
/// use ndarray::array;
///
/// let metrics = wasserstein_distance(
///     &array![0.0, 1.0, 3.0].into_dyn(),
///     &array![5.0, 6.0, 8.0].into_dyn(),
///     &MetricArgs::new(),
/// )
/// .unwrap();
/// assert_eq!(metrics.scalar("wasserstein_distance"), Some(5.0));
/// ```
pub fn wasserstein_distance(
    u_values: &ArrayD<f64>,
    v_values: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    distance(u_values, v_values, "wasserstein_distance", args, |u, v| {
        cdf_integral(u, v, 1)
    })
}

/// Energy distance, `sqrt(2)` times the L2 distance between the CDFs.
pub fn energy_distance(
    u_values: &ArrayD<f64>,
    v_values: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    distance(u_values, v_values, "energy_distance", args, |u, v| {
        std::f64::consts::SQRT_2 * cdf_integral(u, v, 2).sqrt()
    })
}
