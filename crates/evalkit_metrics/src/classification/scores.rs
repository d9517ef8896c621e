//! Precision, recall, F-beta and Jaccard scores for every label type.

use ndarray::ArrayD;

use evalkit_core::{Metrics, Result};

use super::counts::{binary_tally, insert_averaged, multiclass_tallies, multilabel_tallies, Score};
use crate::args::MetricArgs;
use crate::label::{find_label_type, resolve, LabelType};
use crate::nan::{preprocess_pair, preprocess_same_rows};

fn binary_scores(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    scores: &[Score],
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    let tally = (!paired.is_degenerate()).then(|| binary_tally(&paired.lhs, &paired.rhs));
    for score in scores {
        let value = tally.as_ref().map_or(f64::NAN, |t| score.compute(t));
        metrics.insert(score.name(), value);
    }
    Ok(args.decorate(metrics))
}

fn multiclass_scores(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    scores: &[Score],
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    let tallies = (!paired.is_degenerate()).then(|| multiclass_tallies(&paired.lhs, &paired.rhs));
    for score in scores {
        insert_averaged(&mut metrics, *score, tallies.as_deref());
    }
    Ok(args.decorate(metrics))
}

fn multilabel_scores(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    scores: &[Score],
    args: &MetricArgs,
) -> Result<Metrics> {
    let rows = preprocess_same_rows(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", rows.count());
    let tallies = (!rows.is_degenerate()).then(|| multilabel_tallies(&rows.lhs, &rows.rhs));
    for score in scores {
        insert_averaged(&mut metrics, *score, tallies.as_deref());
    }
    Ok(args.decorate(metrics))
}

fn dispatch(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    label_type: LabelType,
    scores: &[Score],
    args: &MetricArgs,
) -> Result<Metrics> {
    match resolve(label_type, || find_label_type(y_true, y_pred)) {
        LabelType::Multiclass => multiclass_scores(y_true, y_pred, scores, args),
        LabelType::Multilabel => multilabel_scores(y_true, y_pred, scores, args),
        LabelType::Binary | LabelType::Auto => binary_scores(y_true, y_pred, scores, args),
    }
}

fn fbetas(betas: &[f64]) -> Vec<Score> {
    betas.iter().map(|b| Score::FBeta(*b)).collect()
}

/// Precision of the positive label `1`: `{count, precision}`.
///
/// # Example
///
/// ```rust
/// use evalkit_metrics::{binary_precision, MetricArgs};
/// use ndarray::array;
///
/// let metrics = binary_precision(
///     &array![1.0, 0.0, 0.0, 1.0].into_dyn(),
///     &array![1.0, 0.0, 1.0, 0.0].into_dyn(),
///     &MetricArgs::new(),
/// )
/// .unwrap();
/// assert_eq!(metrics.count("count"), Some(4));
/// assert_eq!(metrics.scalar("precision"), Some(0.5));
/// ```
pub fn binary_precision(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    binary_scores(y_true, y_pred, &[Score::Precision], args)
}

/// Per-class precision with macro, micro and weighted averages.
pub fn multiclass_precision(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multiclass_scores(y_true, y_pred, &[Score::Precision], args)
}

/// Per-label precision with macro, micro and weighted averages.
///
/// A 1-D input is a single label column.
pub fn multilabel_precision(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multilabel_scores(y_true, y_pred, &[Score::Precision], args)
}

/// Precision with label-type dispatch.
pub fn precision(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    label_type: LabelType,
    args: &MetricArgs,
) -> Result<Metrics> {
    dispatch(y_true, y_pred, label_type, &[Score::Precision], args)
}

/// Recall of the positive label `1`: `{count, recall}`.
pub fn binary_recall(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    binary_scores(y_true, y_pred, &[Score::Recall], args)
}

/// Per-class recall with macro, micro and weighted averages.
pub fn multiclass_recall(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multiclass_scores(y_true, y_pred, &[Score::Recall], args)
}

/// Per-label recall with macro, micro and weighted averages.
pub fn multilabel_recall(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multilabel_scores(y_true, y_pred, &[Score::Recall], args)
}

/// Recall with label-type dispatch.
pub fn recall(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    label_type: LabelType,
    args: &MetricArgs,
) -> Result<Metrics> {
    dispatch(y_true, y_pred, label_type, &[Score::Recall], args)
}

/// Jaccard index of the positive label `1`: `{count, jaccard}`.
pub fn binary_jaccard(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    binary_scores(y_true, y_pred, &[Score::Jaccard], args)
}

/// Per-class Jaccard index with macro, micro and weighted averages.
pub fn multiclass_jaccard(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multiclass_scores(y_true, y_pred, &[Score::Jaccard], args)
}

/// Per-label Jaccard index with macro, micro and weighted averages.
pub fn multilabel_jaccard(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multilabel_scores(y_true, y_pred, &[Score::Jaccard], args)
}

/// Jaccard index with label-type dispatch.
pub fn jaccard(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    label_type: LabelType,
    args: &MetricArgs,
) -> Result<Metrics> {
    dispatch(y_true, y_pred, label_type, &[Score::Jaccard], args)
}

/// F-beta scores of the positive label, one key `f<beta>` per beta.
pub fn binary_fbeta_score(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    betas: &[f64],
    args: &MetricArgs,
) -> Result<Metrics> {
    binary_scores(y_true, y_pred, &fbetas(betas), args)
}

/// Per-class F-beta scores with averages, for every beta.
pub fn multiclass_fbeta_score(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    betas: &[f64],
    args: &MetricArgs,
) -> Result<Metrics> {
    multiclass_scores(y_true, y_pred, &fbetas(betas), args)
}

/// Per-label F-beta scores with averages, for every beta.
pub fn multilabel_fbeta_score(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    betas: &[f64],
    args: &MetricArgs,
) -> Result<Metrics> {
    multilabel_scores(y_true, y_pred, &fbetas(betas), args)
}

/// F-beta scores with label-type dispatch.
pub fn fbeta_score(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    betas: &[f64],
    label_type: LabelType,
    args: &MetricArgs,
) -> Result<Metrics> {
    dispatch(y_true, y_pred, label_type, &fbetas(betas), args)
}
