//! # evalkit_metrics
//!
//! Metric functions over `ndarray` arrays, each returning a flat [`Metrics`]
//! mapping whose keys can be decorated with a prefix and a suffix.
//!
//! This crate provides:
//! - Classification metrics (accuracy, precision, recall, F-beta, Jaccard,
//!   confusion matrices) with binary, multiclass and multilabel variants
//! - Ranking metrics (ROC AUC, average precision, top-k accuracy, NDCG)
//! - Regression metrics (MAE, MSE, RMSE, MSLE, MAPE, R², Tweedie deviance)
//! - Distribution distances (Wasserstein, energy) and divergences (Jensen-Shannon, KL)
//! - Pearson and Spearman correlations
//!
//! Every function honours a [`NanPolicy`](evalkit_core::NanPolicy) through
//! [`MetricArgs`]: `omit` drops the NaN positions jointly, `propagate` yields
//! NaN statistics and `raise` fails with [`CoreError::NanFound`](evalkit_core::CoreError).
//!
//! ## Example
//!
//! ```rust
//! use evalkit_core::NanPolicy;
//! use evalkit_metrics::{accuracy, MetricArgs};
//! use ndarray::array;
//!
//! let args = MetricArgs::new().with_nan_policy(NanPolicy::Omit);
//! let metrics = accuracy(
//!     &array![1.0, 0.0, f64::NAN, 1.0].into_dyn(),
//!     &array![1.0, 0.0, 1.0, 0.0].into_dyn(),
//!     &args,
//! )
//! .unwrap();
//! assert_eq!(metrics.count("count"), Some(3));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod args;
mod classification;
mod correlation;
mod distribution;
mod label;
mod nan;
mod regression;
mod special;

pub use args::MetricArgs;
pub use classification::*;
pub use correlation::{pearsonr, spearmanr};
pub use distribution::{energy_distance, jensen_shannon_divergence, kl_div, wasserstein_distance};
pub use evalkit_core::{MetricValue, Metrics};
pub use label::{find_label_type, find_score_label_type, LabelType};
pub use regression::{
    mean_absolute_error, mean_absolute_percentage_error, mean_squared_error,
    mean_squared_log_error, mean_tweedie_deviance, median_absolute_error, r2_score,
    regression_errors, root_mean_squared_error,
};
