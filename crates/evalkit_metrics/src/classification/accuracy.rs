//! Accuracy and balanced accuracy.

use ndarray::ArrayD;

use evalkit_core::{MetricValue, Metrics, Result};

use super::counts::multiclass_tallies;
use crate::args::MetricArgs;
use crate::nan::preprocess_pair;

/// Fraction of matching labels.
///
/// Output keys: `accuracy`, `count`, `count_correct`, `count_incorrect`,
/// `error`. Multi-dimensional inputs are flattened.
///
/// # Example
///
/// ```rust
/// use evalkit_metrics::{accuracy, MetricArgs};
/// use ndarray::array;
///
/// let metrics = accuracy(
///     &array![1.0, 0.0, 0.0, 1.0].into_dyn(),
///     &array![0.0, 1.0, 1.0, 0.0].into_dyn(),
///     &MetricArgs::new(),
/// )
/// .unwrap();
/// assert_eq!(metrics.scalar("accuracy"), Some(0.0));
/// assert_eq!(metrics.count("count_incorrect"), Some(4));
/// ```
pub fn accuracy(y_true: &ArrayD<f64>, y_pred: &ArrayD<f64>, args: &MetricArgs) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let count = paired.count();
    let mut metrics = Metrics::new();
    metrics.insert("count", count);
    if paired.is_degenerate() {
        metrics.insert("accuracy", f64::NAN);
        metrics.insert("count_correct", MetricValue::nan());
        metrics.insert("count_incorrect", MetricValue::nan());
        metrics.insert("error", f64::NAN);
    } else {
        let correct = paired
            .lhs
            .iter()
            .zip(paired.rhs.iter())
            .filter(|(t, p)| t == p)
            .count();
        let accuracy = correct as f64 / count as f64;
        metrics.insert("accuracy", accuracy);
        metrics.insert("count_correct", correct);
        metrics.insert("count_incorrect", count - correct);
        metrics.insert("error", 1.0 - accuracy);
    }
    Ok(args.decorate(metrics))
}

/// Mean per-class recall over the classes present in `y_true`.
///
/// Output keys: `balanced_accuracy`, `count`.
pub fn balanced_accuracy(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    let value = if paired.is_degenerate() {
        f64::NAN
    } else {
        let recalls: Vec<f64> = multiclass_tallies(&paired.lhs, &paired.rhs)
            .iter()
            .filter(|t| t.support() > 0.0)
            .map(|t| t.tp / t.support())
            .collect();
        recalls.iter().sum::<f64>() / recalls.len() as f64
    };
    metrics.insert("balanced_accuracy", value);
    Ok(args.decorate(metrics))
}
