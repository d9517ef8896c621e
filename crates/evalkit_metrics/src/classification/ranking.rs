//! Score-based ranking metrics: area under the ROC curve and average precision.

use ndarray::{Array1, ArrayD, ArrayView1, Axis};

use evalkit_core::{MetricValue, Metrics, Result};

use crate::args::MetricArgs;
use crate::label::{check_class_indices, find_score_label_type, resolve, LabelType};
use crate::nan::{as_matrix, preprocess_pair, preprocess_rows, preprocess_same_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Curve {
    RocAuc,
    AveragePrecision,
}

impl Curve {
    const fn name(self) -> &'static str {
        match self {
            Self::RocAuc => "roc_auc",
            Self::AveragePrecision => "average_precision",
        }
    }

    fn compute(self, labels: &[bool], scores: &[f64]) -> f64 {
        match self {
            Self::RocAuc => rank_auc(labels, scores),
            Self::AveragePrecision => average_precision_of(labels, scores),
        }
    }
}

/// Mann-Whitney estimate of the ROC AUC, ties counted as half.
///
/// NaN when only one class is present.
fn rank_auc(labels: &[bool], scores: &[f64]) -> f64 {
    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return f64::NAN;
    }
    let ranks = crate::special::average_ranks(scores);
    let rank_sum: f64 = ranks
        .iter()
        .zip(labels)
        .filter(|(_, is_positive)| **is_positive)
        .map(|(rank, _)| rank)
        .sum();
    let (n_pos, n_neg) = (n_pos as f64, n_neg as f64);
    (rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
}

/// Sum of precision times recall increment over the distinct score thresholds.
///
/// NaN when there is no positive sample.
fn average_precision_of(labels: &[bool], scores: &[f64]) -> f64 {
    let n_pos = labels.iter().filter(|&&l| l).count() as f64;
    if n_pos == 0.0 {
        return f64::NAN;
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let (mut tp, mut fp) = (0.0, 0.0);
    let mut previous_recall = 0.0;
    let mut ap = 0.0;
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if labels[order[i]] {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        let recall = tp / n_pos;
        ap += (recall - previous_recall) * tp / (tp + fp);
        previous_recall = recall;
    }
    ap
}

/// One score column against its binary labels.
struct Column {
    labels: Vec<bool>,
    scores: Vec<f64>,
}

impl Column {
    fn new(labels: ArrayView1<'_, f64>, scores: ArrayView1<'_, f64>, positive: f64) -> Self {
        Self {
            labels: labels.iter().map(|v| *v == positive).collect(),
            scores: scores.to_vec(),
        }
    }

    fn support(&self) -> f64 {
        self.labels.iter().filter(|&&l| l).count() as f64
    }
}

/// Insert the per-column vector and its macro, micro and weighted averages.
fn insert_curve_averaged(metrics: &mut Metrics, curve: Curve, columns: Option<&[Column]>) {
    let name = curve.name();
    let Some(columns) = columns else {
        metrics.insert(name, MetricValue::empty_array());
        for average in ["macro", "micro", "weighted"] {
            metrics.insert(format!("{average}_{name}"), f64::NAN);
        }
        return;
    };
    let values: Array1<f64> = columns
        .iter()
        .map(|c| curve.compute(&c.labels, &c.scores))
        .collect();
    let supports: Vec<f64> = columns.iter().map(Column::support).collect();
    let total: f64 = supports.iter().sum();

    let macro_value = if values.is_empty() {
        f64::NAN
    } else {
        values.sum() / values.len() as f64
    };
    let weighted = if total == 0.0 {
        f64::NAN
    } else {
        values
            .iter()
            .zip(&supports)
            .map(|(v, w)| v * w)
            .sum::<f64>()
            / total
    };
    let (labels, scores): (Vec<bool>, Vec<f64>) = columns
        .iter()
        .flat_map(|c| c.labels.iter().copied().zip(c.scores.iter().copied()))
        .unzip();
    let micro = curve.compute(&labels, &scores);

    metrics.insert(name, values);
    metrics.insert(format!("macro_{name}"), macro_value);
    metrics.insert(format!("micro_{name}"), micro);
    metrics.insert(format!("weighted_{name}"), weighted);
}

fn binary_curve(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    curve: Curve,
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_score"), y_true, y_score, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    let value = if paired.is_degenerate() {
        f64::NAN
    } else {
        let column = Column::new(paired.lhs.view(), paired.rhs.view(), 1.0);
        curve.compute(&column.labels, &column.scores)
    };
    metrics.insert(curve.name(), value);
    Ok(args.decorate(metrics))
}

fn multiclass_curve(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    curve: Curve,
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
    let columns = if rows.is_degenerate() {
        None
    } else {
        let labels = rows.lhs.column(0);
        check_class_indices(labels, rows.rhs.ncols())?;
        Some(
            rows.rhs
                .axis_iter(Axis(1))
                .enumerate()
                .map(|(class, scores)| Column::new(labels, scores, class as f64))
                .collect::<Vec<_>>(),
        )
    };
    insert_curve_averaged(&mut metrics, curve, columns.as_deref());
    Ok(args.decorate(metrics))
}

fn multilabel_curve(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    curve: Curve,
    args: &MetricArgs,
) -> Result<Metrics> {
    let rows = preprocess_same_rows(("y_true", "y_score"), y_true, y_score, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", rows.count());
    let columns = (!rows.is_degenerate()).then(|| {
        rows.lhs
            .axis_iter(Axis(1))
            .zip(rows.rhs.axis_iter(Axis(1)))
            .map(|(labels, scores)| Column::new(labels, scores, 1.0))
            .collect::<Vec<_>>()
    });
    insert_curve_averaged(&mut metrics, curve, columns.as_deref());
    Ok(args.decorate(metrics))
}

fn dispatch(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    label_type: LabelType,
    curve: Curve,
    args: &MetricArgs,
) -> Result<Metrics> {
    match resolve(label_type, || find_score_label_type(y_true, y_score)) {
        LabelType::Multiclass => multiclass_curve(y_true, y_score, curve, args),
        LabelType::Multilabel => multilabel_curve(y_true, y_score, curve, args),
        LabelType::Binary | LabelType::Auto => binary_curve(y_true, y_score, curve, args),
    }
}

/// Binary ROC AUC of the positive label `1`: `{count, roc_auc}`.
///
/// ```rust
/// use evalkit_metrics::{binary_roc_auc, MetricArgs};
/// use ndarray::array;
///
/// let metrics = binary_roc_auc(
///     &array![0.0, 0.0, 1.0, 1.0].into_dyn(),
///     &array![0.1, 0.4, 0.35, 0.8].into_dyn(),
///     &MetricArgs::new(),
/// )
/// .unwrap();
/// assert_eq!(metrics.scalar("roc_auc"), Some(0.75));
/// ```
pub fn binary_roc_auc(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    binary_curve(y_true, y_score, Curve::RocAuc, args)
}

/// One-vs-rest ROC AUC. `y_true` holds class indices, `y_score` one column per class.
///
/// A label that is not a column index of `y_score` is an `InvalidValue`.
pub fn multiclass_roc_auc(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multiclass_curve(y_true, y_score, Curve::RocAuc, args)
}

/// Per-label ROC AUC of same-shaped `(n, labels)` arrays.
pub fn multilabel_roc_auc(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multilabel_curve(y_true, y_score, Curve::RocAuc, args)
}

/// ROC AUC with label-type dispatch (see [`find_score_label_type`]).
pub fn roc_auc(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    label_type: LabelType,
    args: &MetricArgs,
) -> Result<Metrics> {
    dispatch(y_true, y_score, label_type, Curve::RocAuc, args)
}

/// Binary average precision of the positive label `1`: `{count, average_precision}`.
pub fn binary_average_precision(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    binary_curve(y_true, y_score, Curve::AveragePrecision, args)
}

/// One-vs-rest average precision, with the label rules of [`multiclass_roc_auc`].
pub fn multiclass_average_precision(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multiclass_curve(y_true, y_score, Curve::AveragePrecision, args)
}

/// Per-label average precision.
pub fn multilabel_average_precision(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    multilabel_curve(y_true, y_score, Curve::AveragePrecision, args)
}

/// Average precision with label-type dispatch.
pub fn average_precision(
    y_true: &ArrayD<f64>,
    y_score: &ArrayD<f64>,
    label_type: LabelType,
    args: &MetricArgs,
) -> Result<Metrics> {
    dispatch(y_true, y_score, label_type, Curve::AveragePrecision, args)
}
