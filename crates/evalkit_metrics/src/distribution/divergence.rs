//! Divergences between discrete distributions.

use ndarray::{Array1, ArrayD};

use evalkit_core::{Metrics, Result};

use crate::args::MetricArgs;
use crate::nan::preprocess_pair;

/// Elementwise relative entropy `p ln(p / q)`, with `0 ln(0 / q) = 0`.
fn rel_entr(p: f64, q: f64) -> f64 {
    if p > 0.0 && q > 0.0 {
        p * (p / q).ln()
    } else if p == 0.0 && q >= 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

fn kl(p: &Array1<f64>, q: &Array1<f64>) -> f64 {
    p.iter().zip(q.iter()).map(|(p, q)| rel_entr(*p, *q)).sum()
}

fn normalized(values: &Array1<f64>) -> Array1<f64> {
    values / values.sum()
}

/// Jensen-Shannon divergence of two distributions after normalizing each to
/// sum 1, in nats. Output keys: `size`, `jensen_shannon_divergence`.
///
/// ```rust
/// use evalkit_metrics::{jensen_shannon_divergence, MetricArgs};
/// use ndarray::array;
///
/// let p = array![0.1, 0.6, 0.1, 0.2].into_dyn();
/// let metrics = jensen_shannon_divergence(&p, &p, &MetricArgs::new()).unwrap();
/// assert_eq!(metrics.scalar("jensen_shannon_divergence"), Some(0.0));
/// assert_eq!(metrics.count("size"), Some(4));
/// ```
pub fn jensen_shannon_divergence(
    p: &ArrayD<f64>,
    q: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("p", "q"), p, q, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("size", paired.count());
    let value = if paired.is_degenerate() {
        f64::NAN
    } else {
        let (p, q) = (normalized(&paired.lhs), normalized(&paired.rhs));
        let m = (&p + &q) / 2.0;
        (kl(&p, &m) + kl(&q, &m)) / 2.0
    };
    metrics.insert("jensen_shannon_divergence", value);
    Ok(args.decorate(metrics))
}

/// Kullback-Leibler divergences in both directions, on the raw values.
/// Output keys: `size`, `kl_pq`, `kl_qp`.
pub fn kl_div(p: &ArrayD<f64>, q: &ArrayD<f64>, args: &MetricArgs) -> Result<Metrics> {
    let paired = preprocess_pair(("p", "q"), p, q, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("size", paired.count());
    let (pq, qp) = if paired.is_degenerate() {
        (f64::NAN, f64::NAN)
    } else {
        (kl(&paired.lhs, &paired.rhs), kl(&paired.rhs, &paired.lhs))
    };
    metrics.insert("kl_pq", pq);
    metrics.insert("kl_qp", qp);
    Ok(args.decorate(metrics))
}
