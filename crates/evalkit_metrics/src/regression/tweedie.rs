//! Mean Tweedie deviance.

use ndarray::{Array1, ArrayD};

use evalkit_core::{CoreError, Metrics, Result};

use crate::args::{key_number, MetricArgs};
use crate::nan::preprocess_pair;

fn domain_error(power: f64, requirement: &str) -> CoreError {
    CoreError::InvalidValue(format!(
        "Mean Tweedie deviance error with power={} can only be used on {requirement}",
        key_number(power)
    ))
}

/// Validate the value domain of `power`, then return the mean unit deviance.
fn deviance(y_true: &Array1<f64>, y_pred: &Array1<f64>, power: f64) -> Result<f64> {
    let all = |values: &Array1<f64>, f: fn(f64) -> bool| values.iter().all(|v| f(*v));
    let positive = |v: f64| v > 0.0;
    let non_negative = |v: f64| v >= 0.0;

    if power > 0.0 && power < 1.0 {
        return Err(CoreError::InvalidValue(format!(
            "Tweedie deviance is only defined for power<=0 and power>=1, received {}",
            key_number(power)
        )));
    }
    if power < 0.0 && !all(y_pred, positive) {
        return Err(domain_error(power, "strictly positive y_pred"));
    }
    if (1.0..2.0).contains(&power) && !(all(y_true, non_negative) && all(y_pred, positive)) {
        return Err(domain_error(power, "non-negative y_true and strictly positive y_pred"));
    }
    if power >= 2.0 && !(all(y_true, positive) && all(y_pred, positive)) {
        return Err(domain_error(power, "strictly positive y_true and y_pred"));
    }

    let unit = |t: f64, p: f64| -> f64 {
        if power == 0.0 {
            (t - p).powi(2)
        } else if power == 1.0 {
            let xlogy = if t == 0.0 { 0.0 } else { t * (t / p).ln() };
            2.0 * (xlogy - t + p)
        } else if power == 2.0 {
            2.0 * ((p / t).ln() + t / p - 1.0)
        } else {
            2.0 * (t.max(0.0).powf(2.0 - power) / ((1.0 - power) * (2.0 - power))
                - t * p.powf(1.0 - power) / (1.0 - power)
                + p.powf(2.0 - power) / (2.0 - power))
        }
    };
    let total: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| unit(*t, *p))
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Mean Tweedie deviance for each power: keys `mean_tweedie_deviance_power_<p>`
/// and `count`.
///
/// Power 0 is the squared error, 1 the Poisson and 2 the Gamma deviance.
///
/// ```rust
/// use evalkit_metrics::{mean_tweedie_deviance, MetricArgs};
/// use ndarray::array;
///
/// let metrics = mean_tweedie_deviance(
///     &array![4.0, 3.0, 2.0, 1.0].into_dyn(),
///     &array![1.0, 2.0, 3.0, 4.0].into_dyn(),
///     &[0.0],
///     &MetricArgs::new(),
/// )
/// .unwrap();
/// assert_eq!(metrics.scalar("mean_tweedie_deviance_power_0"), Some(5.0));
/// ```
pub fn mean_tweedie_deviance(
    y_true: &ArrayD<f64>,
    y_pred: &ArrayD<f64>,
    powers: &[f64],
    args: &MetricArgs,
) -> Result<Metrics> {
    let paired = preprocess_pair(("y_true", "y_pred"), y_true, y_pred, args.nan_policy)?;
    let mut metrics = Metrics::new();
    metrics.insert("count", paired.count());
    for &power in powers {
        let value = if paired.is_degenerate() {
            f64::NAN
        } else {
            deviance(&paired.lhs, &paired.rhs, power)?
        };
        metrics.insert(
            format!("mean_tweedie_deviance_power_{}", key_number(power)),
            value,
        );
    }
    Ok(args.decorate(metrics))
}
