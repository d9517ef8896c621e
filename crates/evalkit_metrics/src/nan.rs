//! NaN-policy preprocessing shared by the metric functions.

use ndarray::{Array1, Array2, ArrayD, Axis, Ix2};

use evalkit_core::array::{check_same_shape_named, flatten, shape_str};
use evalkit_core::{CoreError, NanPolicy, Result};

/// Whether `values` contains NaN, failing under [`NanPolicy::Raise`].
pub(crate) fn contains_nan<'a>(
    values: impl IntoIterator<Item = &'a f64>,
    nan_policy: NanPolicy,
    name: &str,
) -> Result<bool> {
    let has_nan = values.into_iter().any(|v| v.is_nan());
    if has_nan && nan_policy == NanPolicy::Raise {
        return Err(CoreError::NanFound {
            name: name.to_string(),
        });
    }
    Ok(has_nan)
}

/// Two flattened arrays after NaN handling.
#[derive(Debug, Clone)]
pub(crate) struct Paired {
    pub(crate) lhs: Array1<f64>,
    pub(crate) rhs: Array1<f64>,
    pub(crate) has_nan: bool,
}

impl Paired {
    pub(crate) fn count(&self) -> usize {
        self.lhs.len()
    }

    /// Whether the statistics must be NaN: empty input or propagated NaN.
    pub(crate) fn is_degenerate(&self) -> bool {
        self.count() == 0 || self.has_nan
    }
}

/// Check shapes, flatten, then apply the NaN policy elementwise.
///
/// Under `omit` a position is kept only when both arrays are non-NaN there.
/// Under `raise` the left array is checked first.
pub(crate) fn preprocess_pair(
    names: (&str, &str),
    lhs: &ArrayD<f64>,
    rhs: &ArrayD<f64>,
    nan_policy: NanPolicy,
) -> Result<Paired> {
    check_same_shape_named(names.0, lhs, names.1, rhs)?;
    let (mut lhs, mut rhs) = (flatten(lhs), flatten(rhs));
    if nan_policy == NanPolicy::Omit {
        let keep: Vec<usize> = (0..lhs.len())
            .filter(|&i| !lhs[i].is_nan() && !rhs[i].is_nan())
            .collect();
        lhs = keep.iter().map(|&i| lhs[i]).collect();
        rhs = keep.iter().map(|&i| rhs[i]).collect();
    }
    let lhs_nan = contains_nan(lhs.iter(), nan_policy, names.0)?;
    let rhs_nan = contains_nan(rhs.iter(), nan_policy, names.1)?;
    Ok(Paired {
        lhs,
        rhs,
        has_nan: lhs_nan || rhs_nan,
    })
}

/// Two matrices sharing their rows, after row-wise NaN handling.
#[derive(Debug, Clone)]
pub(crate) struct PairedRows {
    pub(crate) lhs: Array2<f64>,
    pub(crate) rhs: Array2<f64>,
    pub(crate) has_nan: bool,
}

impl PairedRows {
    pub(crate) fn count(&self) -> usize {
        self.lhs.nrows()
    }

    pub(crate) fn is_degenerate(&self) -> bool {
        self.count() == 0 || self.has_nan
    }
}

/// View a 1-D array as one column, or a 2-D array as itself.
pub(crate) fn as_matrix(name: &str, array: &ArrayD<f64>) -> Result<Array2<f64>> {
    match array.ndim() {
        1 => Ok(array
            .view()
            .insert_axis(Axis(1))
            .into_dimensionality::<Ix2>()
            .map_err(|e| CoreError::InvalidValue(e.to_string()))?
            .to_owned()),
        2 => array
            .view()
            .into_dimensionality::<Ix2>()
            .map(|m| m.to_owned())
            .map_err(|e| CoreError::InvalidValue(e.to_string())),
        _ => Err(CoreError::InvalidValue(format!(
            "Incorrect '{name}'. Expected a 1-D or 2-D array but received an array of shape {}",
            shape_str(array.shape())
        ))),
    }
}

/// Apply the NaN policy row-wise: under `omit` a row is dropped when it has
/// a NaN in either matrix.
pub(crate) fn preprocess_rows(
    names: (&str, &str),
    lhs: Array2<f64>,
    rhs: Array2<f64>,
    nan_policy: NanPolicy,
) -> Result<PairedRows> {
    if lhs.nrows() != rhs.nrows() {
        return Err(CoreError::ShapeMismatch(format!(
            "'{}' and '{}' have different numbers of rows: {} vs {}",
            names.0,
            names.1,
            lhs.nrows(),
            rhs.nrows()
        )));
    }
    let (lhs, rhs) = if nan_policy == NanPolicy::Omit {
        let keep: Vec<usize> = (0..lhs.nrows())
            .filter(|&i| {
                !lhs.row(i).iter().any(|v| v.is_nan()) && !rhs.row(i).iter().any(|v| v.is_nan())
            })
            .collect();
        (lhs.select(Axis(0), &keep), rhs.select(Axis(0), &keep))
    } else {
        (lhs, rhs)
    };
    let lhs_nan = contains_nan(lhs.iter(), nan_policy, names.0)?;
    let rhs_nan = contains_nan(rhs.iter(), nan_policy, names.1)?;
    Ok(PairedRows {
        lhs,
        rhs,
        has_nan: lhs_nan || rhs_nan,
    })
}

/// Row-wise preprocessing of two same-shaped arrays, 1-D inputs becoming one column.
pub(crate) fn preprocess_same_rows(
    names: (&str, &str),
    lhs: &ArrayD<f64>,
    rhs: &ArrayD<f64>,
    nan_policy: NanPolicy,
) -> Result<PairedRows> {
    check_same_shape_named(names.0, lhs, names.1, rhs)?;
    preprocess_rows(
        names,
        as_matrix(names.0, lhs)?,
        as_matrix(names.1, rhs)?,
        nan_policy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_preprocess_pair_omit() {
        let t = array![1.0, 0.0, f64::NAN, 1.0].into_dyn();
        let p = array![1.0, f64::NAN, 0.0, 0.0].into_dyn();
        let out = preprocess_pair(("y_true", "y_pred"), &t, &p, NanPolicy::Omit).unwrap();
        assert_eq!(out.lhs.to_vec(), vec![1.0, 1.0]);
        assert_eq!(out.rhs.to_vec(), vec![1.0, 0.0]);
        assert!(!out.has_nan);
    }

    #[test]
    fn test_preprocess_pair_propagate() {
        let t = array![1.0, 0.0, f64::NAN].into_dyn();
        let p = array![1.0, 0.0, 1.0].into_dyn();
        let out = preprocess_pair(("y_true", "y_pred"), &t, &p, NanPolicy::Propagate).unwrap();
        assert_eq!(out.count(), 3);
        assert!(out.is_degenerate());
    }

    #[test]
    fn test_preprocess_pair_raise_order() {
        let t = array![1.0, f64::NAN].into_dyn();
        let p = array![f64::NAN, 0.0].into_dyn();
        let err = preprocess_pair(("y_true", "y_pred"), &t, &p, NanPolicy::Raise).unwrap_err();
        assert_eq!(err.to_string(), "'y_true' contains at least one NaN value");
        let t = array![1.0, 0.0].into_dyn();
        let err = preprocess_pair(("y_true", "y_pred"), &t, &p, NanPolicy::Raise).unwrap_err();
        assert_eq!(err.to_string(), "'y_pred' contains at least one NaN value");
    }

    #[test]
    fn test_preprocess_pair_shape() {
        let t = array![1.0, 0.0].into_dyn();
        let p = array![1.0, 0.0, 1.0].into_dyn();
        let err = preprocess_pair(("y_true", "y_pred"), &t, &p, NanPolicy::Omit).unwrap_err();
        assert!(matches!(err, CoreError::ShapeMismatch(_)));
    }

    #[test]
    fn test_preprocess_rows_omit() {
        let t = array![[1.0, 0.0], [0.0, f64::NAN], [1.0, 1.0]];
        let s = array![[0.5, 0.5], [0.1, 0.2], [f64::NAN, 0.3]];
        let out = preprocess_rows(("y_true", "y_score"), t, s, NanPolicy::Omit).unwrap();
        assert_eq!(out.count(), 1);
        assert_eq!(out.lhs, array![[1.0, 0.0]]);
    }

    #[test]
    fn test_as_matrix() {
        let m = as_matrix("y", &array![1.0, 2.0, 3.0].into_dyn()).unwrap();
        assert_eq!(m.dim(), (3, 1));
        assert!(as_matrix("y", &ArrayD::zeros(ndarray::IxDyn(&[2, 2, 2]))).is_err());
    }
}
