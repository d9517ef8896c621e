//! Top-k accuracy.

use ndarray::ArrayD;

use evalkit_core::{CoreError, Metrics, Result};

use crate::args::MetricArgs;
use crate::label::{check_class_indices, find_score_label_type, resolve, LabelType};
use crate::nan::{as_matrix, preprocess_pair, preprocess_rows};

fn key(k: usize) -> String {
    format!("top_{k}_accuracy")
}

/// Binary top-k accuracy: `{count, top_<k>_accuracy}` per `k`.
///
/// With a single score per sample, `k = 1` is the accuracy of thresholding
/// the score, and any larger `k` always covers the true label. Scores within
/// `[0, 1]` are thresholded at `0.5`, anything else (logits, decision values)
/// at `0`.
pub fn binary_top_k_accuracy(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    k: &[usize],
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_score"), y_true, y_score, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    let thresholded = if paired.is_degenerate() {
        f64::NAN
    } else {
        let threshold = if paired.rhs.iter().all(|s| (0.0..=1.0).contains(s)) {
            0.5
        } else {
            0.0
        };
        let correct = paired
            .lhs
            .iter()
            .zip(paired.rhs.iter())
            .filter(|(t, s)| (**t == 1.0) == (**s > threshold))
            .count();
        correct as f64 / paired.count() as f64
    };
    for &k in k {
        let value = if paired.is_degenerate() || k <= 1 {
            thresholded
        } else {
            1.0
        };
        metrics.insert(key(k), value);
    }
    Ok(args.decorate(metrics))
}

/// Multiclass top-k accuracy. `y_true` holds class indices and `y_score`
/// one column per class; a sample is correct when fewer than `k` classes
/// score strictly higher than its true class. A label that is not a column
/// index of `y_score` is an `InvalidValue`.
pub fn multiclass_top_k_accuracy(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    k: &[usize],
    args: &MetricArgs,
) -> Result<Metrics> {
    let rows = preprocess_rows(
        ("y_true", "y_score"),
        as_matrix("y_true", y_true)?,
        as_matrix("y_score", y_score)?,
        args.nan_policy,
    )?;
    let mut metrics = Metrics::new();
    metrics.insert("count", rows.count());
    // Number of classes scoring strictly above the true class.
    let ranks: Vec<usize> = if rows.is_degenerate() {
        Vec::new()
    } else {
        check_class_indices(rows.lhs.column(0), rows.rhs.ncols())?;
        rows.lhs
            .column(0)
            .iter()
            .zip(rows.rhs.rows())
            .map(|(label, scores)| {
                let target = scores[*label as usize];
                scores.iter().filter(|s| **s > target).count()
            })
            .collect()
    };
    for &k in k {
        let value = if rows.is_degenerate() {
            f64::NAN
        } else {
            let correct = ranks.iter().filter(|rank| **rank < k).count();
            correct as f64 / rows.count() as f64
        };
        metrics.insert(key(k), value);
    }
    Ok(args.decorate(metrics))
}

/// Top-k accuracy with label-type dispatch. Multilabel inputs are rejected.
pub fn top_k_accuracy(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    k: &[usize],
    label_type: LabelType,
    args: &MetricArgs,
) -> Result<Metrics> {
    match resolve(label_type, || find_score_label_type(y_true, y_score)) {
        LabelType::Multiclass => multiclass_top_k_accuracy(y_true, y_score, k, args),
        LabelType::Multilabel => Err(CoreError::InvalidValue(
            "top-k accuracy does not support multilabel inputs".to_string(),
        )),
        LabelType::Binary | LabelType::Auto => binary_top_k_accuracy(y_true, y_score, k, args),
    }
}
