//! Array checking and filtering helpers.

use ndarray::{Array1, ArrayD, Zip};

use crate::error::{CoreError, Result};

/// Format a shape the way it appears in error messages, e.g. `(5,)` or `(2, 3)`.
///
/// # Example
///
/// ```rust
/// use evalkit_core::array::shape_str;
///
/// assert_eq!(shape_str(&[5]), "(5,)");
/// assert_eq!(shape_str(&[2, 3]), "(2, 3)");
/// ```
#[must_use]
pub fn shape_str(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({n},)"),
        dims => format!(
            "({})",
            dims.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Check that all arrays share one shape.
///
/// # Errors
///
/// Returns [`CoreError::ShapeMismatch`] listing every shape when they differ.
pub fn check_same_shape(arrays: &[&ArrayD<f64>]) -> Result<()> {
    let Some(first) = arrays.first() else {
        return Ok(());
    };
    if arrays.iter().all(|a| a.shape() == first.shape()) {
        return Ok(());
    }
    let shapes = arrays
        .iter()
        .map(|a| shape_str(a.shape()))
        .collect::<Vec<_>>()
        .join(", ");
    Err(CoreError::ShapeMismatch(format!(
        "arrays have different shapes: [{shapes}]"
    )))
}

/// Check that two named arrays share one shape.
///
/// # Errors
///
/// Returns [`CoreError::ShapeMismatch`] naming both arrays.
pub fn check_same_shape_named(
    lhs_name: &str,
    lhs: &ArrayD<f64>,
    rhs_name: &str,
    rhs: &ArrayD<f64>,
) -> Result<()> {
    if lhs.shape() == rhs.shape() {
        return Ok(());
    }
    Err(CoreError::ShapeMismatch(format!(
        "'{lhs_name}' and '{rhs_name}' have different shapes: {} vs {}",
        shape_str(lhs.shape()),
        shape_str(rhs.shape())
    )))
}

/// Check that an array is a square matrix.
///
/// # Errors
///
/// Returns [`CoreError::InvalidValue`] if the array is not 2-D with
/// equal dimensions.
pub fn check_square_matrix(name: &str, array: &ArrayD<f64>) -> Result<()> {
    match array.shape() {
        [rows, cols] if rows == cols => Ok(()),
        shape => Err(CoreError::InvalidValue(format!(
            "Incorrect '{name}'. The array must be a square matrix but received an array of shape {}",
            shape_str(shape)
        ))),
    }
}

/// Whether an array contains at least one NaN.
#[must_use]
pub fn contains_nan(array: &ArrayD<f64>) -> bool {
    array.iter().any(|v| v.is_nan())
}

/// Mask that is `true` wherever at least one of the arrays is NaN.
///
/// # Errors
///
/// Returns [`CoreError::ShapeMismatch`] if the arrays differ in shape.
pub fn multi_isnan(arrays: &[&ArrayD<f64>]) -> Result<ArrayD<bool>> {
    check_same_shape(arrays)?;
    let Some(first) = arrays.first() else {
        return Ok(ArrayD::from_elem(ndarray::IxDyn(&[0]), false));
    };
    let mut mask = first.mapv(f64::is_nan);
    for array in &arrays[1..] {
        Zip::from(&mut mask)
            .and(*array)
            .for_each(|m, &v| *m = *m || v.is_nan());
    }
    Ok(mask)
}

/// Flatten an array in logical (row-major) order.
#[must_use]
pub fn flatten(array: &ArrayD<f64>) -> Array1<f64> {
    array.iter().copied().collect()
}

/// Flattened non-NaN values.
///
/// # Example
///
/// ```rust
/// use evalkit_core::array::nonnan;
/// use ndarray::array;
///
/// let values = nonnan(&array![1.0, f64::NAN, 3.0].into_dyn());
/// assert_eq!(values.to_vec(), vec![1.0, 3.0]);
/// ```
#[must_use]
pub fn nonnan(array: &ArrayD<f64>) -> Array1<f64> {
    array.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Flattened values within `[xmin, xmax]`.
#[must_use]
pub fn filter_range(array: &ArrayD<f64>, xmin: f64, xmax: f64) -> Array1<f64> {
    array
        .iter()
        .copied()
        .filter(|v| *v >= xmin && *v <= xmax)
        .collect()
}
