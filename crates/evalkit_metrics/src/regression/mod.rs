//! Regression metrics over flattened `y_true` / `y_pred` pairs.

mod errors;
mod tweedie;

pub use errors::{
    mean_absolute_error, mean_absolute_percentage_error, mean_squared_error,
    mean_squared_log_error, median_absolute_error, r2_score, regression_errors,
    root_mean_squared_error,
};
pub use tweedie::mean_tweedie_deviance;
