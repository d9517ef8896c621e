//! Error-based regression metrics.

use ndarray::{Array1, ArrayD, Zip};

use evalkit_core::{CoreError, Metrics, Result};

use crate::args::MetricArgs;
use crate::nan::{preprocess_pair, Paired};
use crate::special::median;

/// Preprocess the pair, then compute one statistic unless the input is degenerate.
fn single(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    name: &str,
    args: &MetricArgs,
    statistic: impl FnOnce(&Array1<f64>, &Array1<f64>) -> Result<f64>,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    metrics.insert(name, compute(&paired, statistic)?);
    Ok(args.decorate(metrics))
}

fn compute(
    paired: &Paired,
    statistic: impl FnOnce(&Array1<f64>, &Array1<f64>) -> Result<f64>,
) -> Result<f64> {
    if paired.is_degenerate() {
        Ok(f64::NAN)
    } else {
        statistic(&paired.lhs, &paired.rhs)
    }
}

fn mean_of(y_true: &Array1<f64>, y_pred: &Array1<f64>, f: impl Fn(f64, f64) -> f64) -> f64 {
    Zip::from(y_true)
        .and(y_pred)
        .fold(0.0, |acc, t, p| acc + f(*t, *p))
        / y_true.len() as f64
}

fn mae(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    mean_of(y_true, y_pred, |t, p| (t - p).abs())
}

fn median_ae(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let errors: Vec<f64> = Zip::from(y_true)
        .and(y_pred)
        .map_collect(|t, p| (t - p).abs())
        .to_vec();
    median(&errors)
}

fn mse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    mean_of(y_true, y_pred, |t, p| (t - p).powi(2))
}

/// Mean absolute error: `{count, mean_absolute_error}`.
///
/// ```rust
/// use evalkit_metrics::{mean_absolute_error, MetricArgs};
/// use ndarray::array;
///
/// let metrics = mean_absolute_error(
///     &array![1.0, 2.0, 3.0, 4.0, 5.0].into_dyn(),
///     &array![1.0, 2.0, 3.0, 4.0, 5.0].into_dyn(),
///     &MetricArgs::new(),
/// )
/// .unwrap();
/// assert_eq!(metrics.scalar("mean_absolute_error"), Some(0.0));
/// assert_eq!(metrics.count("count"), Some(5));
/// ```
pub fn mean_absolute_error(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    single(y_true, y_pred, "mean_absolute_error", args, |t, p| {
        Ok(mae(t, p))
    })
}

/// Median absolute error: `{count, median_absolute_error}`.
pub fn median_absolute_error(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    single(y_true, y_pred, "median_absolute_error", args, |t, p| {
        Ok(median_ae(t, p))
    })
}

/// Mean absolute percentage error, the denominator clamped at machine epsilon.
pub fn mean_absolute_percentage_error(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    single(
        y_true,
        y_pred,
        "mean_absolute_percentage_error",
        args,
        |t, p| Ok(mean_of(t, p, |t, p| (t - p).abs() / t.abs().max(f64::EPSILON))),
    )
}

/// Mean squared error: `{count, mean_squared_error}`.
pub fn mean_squared_error(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    single(y_true, y_pred, "mean_squared_error", args, |t, p| {
        Ok(mse(t, p))
    })
}

/// Mean squared logarithmic error. Negative values are rejected.
pub fn mean_squared_log_error(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    single(y_true, y_pred, "mean_squared_log_error", args, |t, p| {
        if t.iter().chain(p.iter()).any(|v| *v < 0.0) {
            return Err(CoreError::InvalidValue(
                "Mean Squared Logarithmic Error cannot be used when targets contain negative values"
                    .to_string(),
            ));
        }
        Ok(mean_of(t, p, |t, p| (t.ln_1p() - p.ln_1p()).powi(2)))
    })
}

/// Root mean squared error: `{count, root_mean_squared_error}`.
pub fn root_mean_squared_error(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    single(y_true, y_pred, "root_mean_squared_error", args, |t, p| {
        Ok(mse(t, p).sqrt())
    })
}

/// Coefficient of determination: `{count, r2_score}`.
///
/// NaN for fewer than two samples. A constant `y_true` scores 1 when the
/// prediction is exact and 0 otherwise.
pub fn r2_score(y_true: &ArrayD<f64>, y_pred: &ArrayD<f64>, args: &MetricArgs) -> Result<Metrics> {
    single(y_true, y_pred, "r2_score", args, |t, p| {
        if t.len() < 2 {
            return Ok(f64::NAN);
        }
        let mean = t.mean().unwrap_or(f64::NAN);
        let ss_res = mse(t, p) * t.len() as f64;
        let ss_tot: f64 = t.iter().map(|v| (v - mean).powi(2)).sum();
        Ok(if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        })
    })
}

/// Mean absolute, median absolute and mean squared errors in one pass over
/// the preprocessed pair.
pub fn regression_errors(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    metrics.insert("mean_absolute_error", compute(&paired, |t, p| Ok(mae(t, p)))?);
    metrics.insert(
        "median_absolute_error",
        compute(&paired, |t, p| Ok(median_ae(t, p)))?,
    );
    metrics.insert("mean_squared_error", compute(&paired, |t, p| Ok(mse(t, p)))?);
    Ok(args.decorate(metrics))
}
