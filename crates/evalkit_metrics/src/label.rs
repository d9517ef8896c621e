//! Label types and their inference.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use evalkit_core::CoreError;

/// Classification shape category selecting an aggregation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LabelType {
    /// Infer from the data.
    #[default]
    Auto,
    /// Two classes, positive label `1`.
    Binary,
    /// One label per sample among more than two classes.
    Multiclass,
    /// A binary indicator per label and sample.
    Multilabel,
}

impl LabelType {
    /// Value as written in configurations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Binary => "binary",
            Self::Multiclass => "multiclass",
            Self::Multilabel => "multilabel",
        }
    }
}

impl FromStr for LabelType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "auto" => Ok(Self::Auto),
            "binary" => Ok(Self::Binary),
            "multiclass" => Ok(Self::Multiclass),
            "multilabel" => Ok(Self::Multilabel),
            _ => Err(CoreError::InvalidConfig(format!(
                "Incorrect 'label_type': {s}. The valid values are: 'auto', 'binary', 'multiclass', 'multilabel'"
            ))),
        }
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for LabelType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, CoreError> {
        value.parse()
    }
}

impl From<LabelType> for String {
    fn from(value: LabelType) -> Self {
        value.as_str().to_string()
    }
}

fn has_label_columns(array: &ArrayD<f64>) -> bool {
    array.ndim() == 2 && array.shape()[1] > 1
}

/// Infer the label type of a prediction metric.
///
/// 2-D inputs with at least two columns are multilabel. Otherwise the
/// distinct non-NaN values of both arrays decide: at most two values is
/// binary, more is multiclass.
///
/// ```rust
/// use evalkit_metrics::{find_label_type, LabelType};
/// use ndarray::array;
///
/// let y_true = array![1.0, 0.0, f64::NAN, 1.0].into_dyn();
/// let y_pred = array![0.0, 0.0, 1.0, 1.0].into_dyn();
/// assert_eq!(find_label_type(&y_true, &y_pred), LabelType::Binary);
/// ```
#[must_use]
pub fn find_label_type(y_true: &ArrayD<f64>, y_pred: &ArrayD<f64>) -> LabelType {
    if has_label_columns(y_true) || has_label_columns(y_pred) {
        return LabelType::Multilabel;
    }
    let distinct: BTreeSet<u64> = y_true
        .iter()
        .chain(y_pred.iter())
        .filter(|v| !v.is_nan())
        .map(|v| if *v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() })
        .collect();
    if distinct.len() <= 2 {
        LabelType::Binary
    } else {
        LabelType::Multiclass
    }
}

/// Infer the label type of a score metric (`y_score` holds scores, not labels).
///
/// A 2-D `y_true` with several columns is multilabel; otherwise a 2-D
/// `y_score` with several columns (one per class) is multiclass; anything
/// else is binary.
#[must_use]
pub fn find_score_label_type(y_true: &ArrayD<f64>, y_score: &ArrayD<f64>) -> LabelType {
    if has_label_columns(y_true) {
        LabelType::Multilabel
    } else if has_label_columns(y_score) {
        LabelType::Multiclass
    } else {
        LabelType::Binary
    }
}

/// Resolve `Auto` with `infer`, leave explicit label types untouched.
pub(crate) fn resolve(label_type: LabelType, infer: impl FnOnce() -> LabelType) -> LabelType {
    match label_type {
        LabelType::Auto => {
            let inferred = infer();
            tracing::debug!(label_type = %inferred, "inferred label type");
            inferred
        }
        explicit => explicit,
    }
}

/// Check that every multiclass label is a column index of the score matrix.
///
/// Labels are used as indices directly, not remapped through their sorted
/// unique values.
pub(crate) fn check_class_indices<'a>(
    labels: impl IntoIterator<Item = &'a f64>,
    n_classes: usize,
) -> Result<(), CoreError> {
    match labels
        .into_iter()
        .find(|l| **l < 0.0 || l.fract() != 0.0 || **l >= n_classes as f64)
    {
        Some(label) => Err(CoreError::InvalidValue(format!(
            "'y_true' must hold class indices in [0, {n_classes}) matching the columns of \
             'y_score', found {label}"
        ))),
        None => Ok(()),
    }
}
