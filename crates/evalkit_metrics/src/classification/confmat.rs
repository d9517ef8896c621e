//! Confusion matrices (rows are true labels, columns are predictions).

use std::collections::BTreeMap;

use ndarray::{Array2, Array3, ArrayD};

use evalkit_core::{MetricValue, Metrics, Result};

use super::counts::{binary_tally, canonical, class_labels, multilabel_tallies, Tally};
use crate::args::MetricArgs;
use crate::label::{find_label_type, resolve, LabelType};
use crate::nan::{preprocess_pair, preprocess_same_rows};
use crate::special::safe_div;

fn tally_matrix(t: &Tally) -> Array2<f64> {
    ndarray::array![[t.tn, t.fp], [t.fn_, t.tp]]
}

/// Binary confusion matrix `[[tn, fp], [fn, tp]]` of the positive label `1`,
/// with the four counts and rates.
pub fn binary_confusion_matrix(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    if paired.is_degenerate() {
        metrics.insert(
            "confusion_matrix",
            Array2::from_elem((2, 2), f64::NAN).into_dyn(),
        );
        for key in [
            "true_positive",
            "false_positive",
            "true_negative",
            "false_negative",
            "true_positive_rate",
            "false_positive_rate",
            "true_negative_rate",
            "false_negative_rate",
        ] {
            metrics.insert(key, MetricValue::nan());
        }
        return Ok(args.decorate(metrics));
    }
    let t = binary_tally(&paired.lhs, &paired.rhs);
    metrics.insert("confusion_matrix", tally_matrix(&t).into_dyn());
    metrics.insert("true_positive", t.tp as usize);
    metrics.insert("false_positive", t.fp as usize);
    metrics.insert("true_negative", t.tn as usize);
    metrics.insert("false_negative", t.fn_ as usize);
    metrics.insert("true_positive_rate", safe_div(t.tp, t.tp + t.fn_));
    metrics.insert("false_positive_rate", safe_div(t.fp, t.fp + t.tn));
    metrics.insert("true_negative_rate", safe_div(t.tn, t.tn + t.fp));
    metrics.insert("false_negative_rate", safe_div(t.fn_, t.fn_ + t.tp));
    Ok(args.decorate(metrics))
}

/// `(classes, classes)` confusion matrix over the sorted union of labels.
pub fn multiclass_confusion_matrix(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    let matrix = if paired.is_degenerate() {
        Array2::<f64>::zeros((0, 0))
    } else {
        let labels = class_labels(&paired.lhs, &paired.rhs);
        let index: BTreeMap<u64, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.to_bits(), i))
            .collect();
        let mut matrix = Array2::<f64>::zeros((labels.len(), labels.len()));
        for (t, p) in paired.lhs.iter().zip(paired.rhs.iter()) {
            let row = index[&canonical(*t).to_bits()];
            let col = index[&canonical(*p).to_bits()];
            matrix[[row, col]] += 1.0;
        }
        matrix
    };
    metrics.insert("confusion_matrix", matrix.into_dyn());
    Ok(args.decorate(metrics))
}

/// `(labels, 2, 2)` stack of per-label binary confusion matrices.
pub fn multilabel_confusion_matrix(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    let rows = preprocess_same_rows(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", rows.count());
    let stack = if rows.is_degenerate() {
        Array3::<f64>::zeros((0, 2, 2))
    } else {
        let tallies = multilabel_tallies(&rows.lhs, &rows.rhs);
        let mut stack = Array3::<f64>::zeros((tallies.len(), 2, 2));
        for (mut slot, tally) in stack.outer_iter_mut().zip(&tallies) {
            slot.assign(&tally_matrix(tally));
        }
        stack
    };
    metrics.insert("confusion_matrix", stack.into_dyn());
    Ok(args.decorate(metrics))
}

/// Confusion matrix with label-type dispatch.
pub fn confusion_matrix(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    label_type: LabelType,
    args: &MetricArgs,
) -> Result<Metrics> {
    match resolve(label_type, || find_label_type(y_true, y_pred)) {
        LabelType::Multiclass => multiclass_confusion_matrix(y_true, y_pred, args),
        LabelType::Multilabel => multilabel_confusion_matrix(y_true, y_pred, args),
        LabelType::Binary | LabelType::Auto => binary_confusion_matrix(y_true, y_pred, args),
    }
}
