//! Confusion tallies and the per-class score engine behind precision,
//! recall, F-beta and Jaccard.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use evalkit_core::{MetricValue, Metrics};

use crate::args::key_number;
use crate::special::safe_div;

/// Confusion tallies of one class or label.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Tally {
    pub(crate) tp: f64,
    pub(crate) fp: f64,
    pub(crate) fn_: f64,
    pub(crate) tn: f64,
}

impl Tally {
    /// Number of true instances.
    pub(crate) fn support(&self) -> f64 {
        self.tp + self.fn_
    }

    fn add(&mut self, other: &Tally) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
        self.tn += other.tn;
    }

    fn record(&mut self, is_true: bool, is_pred: bool) {
        match (is_true, is_pred) {
            (true, true) => self.tp += 1.0,
            (false, true) => self.fp += 1.0,
            (true, false) => self.fn_ += 1.0,
            (false, false) => self.tn += 1.0,
        }
    }
}

/// Tallies of the positive label `1`.
pub(crate) fn binary_tally(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Tally {
    let mut tally = Tally::default();
    for (t, p) in y_true.iter().zip(y_pred) {
        tally.record(*t == 1.0, *p == 1.0);
    }
    tally
}

/// Label with `-0.0` folded into `0.0`, so labels can be keyed by bits.
pub(crate) fn canonical(label: f64) -> f64 {
    if label == 0.0 {
        0.0
    } else {
        label
    }
}

/// Sorted union of the labels of both arrays.
pub(crate) fn class_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Vec<f64> {
    let mut labels: Vec<f64> = y_true
        .iter()
        .chain(y_pred.iter())
        .map(|v| canonical(*v))
        .collect();
    labels.sort_by(f64::total_cmp);
    labels.dedup();
    labels
}

/// One-vs-rest tallies of every class, in label order.
pub(crate) fn multiclass_tallies(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Vec<Tally> {
    let labels = class_labels(y_true, y_pred);
    let index: BTreeMap<u64, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.to_bits(), i))
        .collect();
    let n = y_true.len() as f64;
    let mut tallies = vec![Tally::default(); labels.len()];
    for (t, p) in y_true.iter().zip(y_pred) {
        let ti = index[&canonical(*t).to_bits()];
        let pi = index[&canonical(*p).to_bits()];
        if ti == pi {
            tallies[ti].tp += 1.0;
        } else {
            tallies[pi].fp += 1.0;
            tallies[ti].fn_ += 1.0;
        }
    }
    for tally in &mut tallies {
        tally.tn = n - tally.tp - tally.fp - tally.fn_;
    }
    tallies
}

/// Binary tallies of every label column.
pub(crate) fn multilabel_tallies(y_true: &Array2<f64>, y_pred: &Array2<f64>) -> Vec<Tally> {
    y_true
        .columns()
        .into_iter()
        .zip(y_pred.columns())
        .map(|(t, p)| {
            let mut tally = Tally::default();
            for (t, p) in t.iter().zip(p.iter()) {
                tally.record(*t == 1.0, *p == 1.0);
            }
            tally
        })
        .collect()
}

/// A score derived from confusion tallies. Zero divisions score 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Score {
    Precision,
    Recall,
    FBeta(f64),
    Jaccard,
}

impl Score {
    pub(crate) fn name(&self) -> String {
        match self {
            Self::Precision => "precision".to_string(),
            Self::Recall => "recall".to_string(),
            Self::FBeta(beta) => format!("f{}", key_number(*beta)),
            Self::Jaccard => "jaccard".to_string(),
        }
    }

    pub(crate) fn compute(&self, t: &Tally) -> f64 {
        match self {
            Self::Precision => safe_div(t.tp, t.tp + t.fp),
            Self::Recall => safe_div(t.tp, t.tp + t.fn_),
            Self::FBeta(beta) => {
                let b2 = beta * beta;
                safe_div((1.0 + b2) * t.tp, (1.0 + b2) * t.tp + b2 * t.fn_ + t.fp)
            }
            Self::Jaccard => safe_div(t.tp, t.tp + t.fp + t.fn_),
        }
    }
}

/// Insert the per-class vector and its macro, micro and weighted averages.
///
/// `None` stands for an empty or NaN-poisoned input: the vector is empty
/// and the averages are NaN.
pub(crate) fn insert_averaged(metrics: &mut Metrics, score: Score, tallies: Option<&[Tally]>) {
    let name = score.name();
    let Some(tallies) = tallies else {
        metrics.insert(name.clone(), MetricValue::empty_array());
        for avg in ["macro", "micro", "weighted"] {
            metrics.insert(format!("{avg}_{name}"), f64::NAN);
        }
        return;
    };
    let per_class: Array1<f64> = tallies.iter().map(|t| score.compute(t)).collect();
    let macro_avg = if per_class.is_empty() {
        f64::NAN
    } else {
        per_class.mean().unwrap_or(f64::NAN)
    };
    let mut total = Tally::default();
    for t in tallies {
        total.add(t);
    }
    let supports: f64 = tallies.iter().map(Tally::support).sum();
    let weighted = safe_div(
        per_class
            .iter()
            .zip(tallies)
            .map(|(s, t)| s * t.support())
            .sum(),
        supports,
    );
    metrics.insert(format!("macro_{name}"), macro_avg);
    metrics.insert(format!("micro_{name}"), score.compute(&total));
    metrics.insert(format!("weighted_{name}"), weighted);
    metrics.insert(name, per_class);
}
