//! Normalized discounted cumulative gain.

use ndarray::{ArrayD, ArrayView1};

use evalkit_core::array::shape_str;
use evalkit_core::{CoreError, Metrics, Result};

use crate::args::MetricArgs;
use crate::nan::preprocess_same_rows;

fn discount(position: usize) -> f64 {
    1.0 / ((position + 2) as f64).log2()
}

/// DCG of one row where tied scores share the average gain of their group.
fn tie_averaged_dcg(gains: ArrayView1<'_, f64>, scores: ArrayView1<'_, f64>, k: usize) -> f64 {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    let mut dcg = 0.0;
    let mut start = 0;
    while start < order.len() && start < k {
        let mut end = start;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let mean_gain =
            order[start..end].iter().map(|&i| gains[i]).sum::<f64>() / (end - start) as f64;
        let discounts: f64 = (start..end.min(k)).map(discount).sum();
        dcg += mean_gain * discounts;
        start = end;
    }
    dcg
}

fn ideal_dcg(gains: ArrayView1<'_, f64>, k: usize) -> f64 {
    let mut sorted = gains.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
        .iter()
        .take(k)
        .enumerate()
        .map(|(position, gain)| gain * discount(position))
        .sum()
}

/// Mean NDCG over the rows of `(n, items)` relevance and score matrices.
///
/// `k` keeps only the top `k` ranks (all ranks when `None`). Rows whose
/// ideal DCG is zero score 0. Output keys: `count`, `ndcg`.
///
/// Non-empty inputs must be 2-D; empty inputs of any rank give a zero count
/// and a NaN score.
///
/// ```rust
/// use evalkit_metrics::{ndcg, MetricArgs};
/// use ndarray::array;
///
/// let metrics = ndcg(
///     &array![[1.0, 0.0, 0.0], [1.0, 2.0, 0.0]].into_dyn(),
///     &array![[2.0, 1.0, 0.0], [0.0, 1.0, -1.0]].into_dyn(),
///     None,
///     &MetricArgs::new(),
/// )
/// .unwrap();
/// assert_eq!(metrics.scalar("ndcg"), Some(1.0));
/// ```
pub fn ndcg(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    k: Option<usize>,
    args: &MetricArgs,
) -> Result<Metrics> {
    if y_true.is_empty() && y_score.is_empty() && (y_true.ndim() != 2 || y_score.ndim() != 2) {
        let mut metrics = Metrics::new();
        metrics.insert("count", 0_usize);
        metrics.insert("ndcg", f64::NAN);
        return Ok(args.decorate(metrics));
    }
    for (name, array) in [("y_true", y_true), ("y_score", y_score)] {
        if array.ndim() != 2 {
            return Err(CoreError::InvalidValue(format!(
                "'{name}' must be a 2-D array but received an array of shape {}",
                shape_str(array.shape())
            )));
        }
    }
    let rows = preprocess_same_rows(("y_true", "y_score"), y_true, y_score, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", rows.count());
    let value = if rows.is_degenerate() {
        f64::NAN
    } else {
        let k = k.unwrap_or(usize::MAX);
        let total: f64 = rows
            .lhs
            .rows()
            .into_iter()
            .zip(rows.rhs.rows())
            .map(|(gains, scores)| {
                let ideal = ideal_dcg(gains, k);
                if ideal == 0.0 {
                    0.0
                } else {
                    tie_averaged_dcg(gains, scores, k) / ideal
                }
            })
            .sum();
        total / rows.count() as f64
    };
    metrics.insert("ndcg", value);
    Ok(args.decorate(metrics))
}
