//! Metric families that analyzers and evaluators can bind to a state.

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use evalkit_core::{CoreError, Metrics, Result};
use evalkit_metrics::{self as m, LabelType, MetricArgs};

/// Statistics capability a metric family depends on.
///
/// The embedding application provides capabilities to an
/// [`AnalyzerRegistry`](crate::AnalyzerRegistry); building an analyzer whose
/// capability was not provided fails with `MissingDependency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Label and score based classification metrics.
    Classification,
    /// Regression errors and deviances.
    Regression,
    /// Distances and divergences between distributions.
    Distribution,
    /// Correlation coefficients and their p-values.
    Correlation,
    /// Ranking metrics over score matrices.
    Ranking,
}

impl Capability {
    /// Every capability.
    pub const ALL: [Capability; 5] = [
        Self::Classification,
        Self::Regression,
        Self::Distribution,
        Self::Correlation,
        Self::Ranking,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Regression => "regression",
            Self::Distribution => "distribution",
            Self::Correlation => "correlation",
            Self::Ranking => "ranking",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options consumed by some metric families; ignored by the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricOptions {
    /// Label type of classification metrics.
    pub label_type: LabelType,
    /// F-beta values.
    pub betas: Vec<f64>,
    /// Top-k accuracy cut-offs.
    pub k: Vec<usize>,
    /// NDCG rank cut-off; all ranks when `None`.
    pub ndcg_k: Option<usize>,
    /// Tweedie powers.
    pub powers: Vec<f64>,
}

impl Default for MetricOptions {
    fn default() -> Self {
        Self {
            label_type: LabelType::Auto,
            betas: vec![1.0],
            k: vec![2],
            ndcg_k: None,
            powers: vec![0.0],
        }
    }
}

macro_rules! metric_kinds {
    ($( $variant:ident => $tag:literal, $capability:ident; )*) => {
        /// A metric family computable over an `(y_true, y_pred)` pair.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MetricKind {
            $(
                #[doc = concat!("`", $tag, "`")]
                $variant,
            )*
        }

        impl MetricKind {
            /// Every metric family.
            pub const ALL: &'static [MetricKind] = &[$(Self::$variant),*];

            /// Registry tag.
            #[must_use]
            pub const fn tag(&self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)*
                }
            }

            /// Capability required to compute this family.
            #[must_use]
            pub const fn capability(&self) -> Capability {
                match self {
                    $(Self::$variant => Capability::$capability,)*
                }
            }
        }
    };
}

metric_kinds! {
    Accuracy => "accuracy", Classification;
    BalancedAccuracy => "balanced_accuracy", Classification;
    Precision => "precision", Classification;
    Recall => "recall", Classification;
    FbetaScore => "fbeta_score", Classification;
    Jaccard => "jaccard", Classification;
    ConfusionMatrix => "confusion_matrix", Classification;
    RocAuc => "roc_auc", Classification;
    AveragePrecision => "average_precision", Classification;
    TopKAccuracy => "top_k_accuracy", Classification;
    Ndcg => "ndcg", Ranking;
    MeanAbsoluteError => "mean_absolute_error", Regression;
    MedianAbsoluteError => "median_absolute_error", Regression;
    MeanAbsolutePercentageError => "mean_absolute_percentage_error", Regression;
    MeanSquaredError => "mean_squared_error", Regression;
    MeanSquaredLogError => "mean_squared_log_error", Regression;
    RootMeanSquaredError => "root_mean_squared_error", Regression;
    R2Score => "r2_score", Regression;
    MeanTweedieDeviance => "mean_tweedie_deviance", Regression;
    RegressionErrors => "regression_errors", Regression;
    Pearson => "pearsonr", Correlation;
    Spearman => "spearmanr", Correlation;
    EnergyDistance => "energy_distance", Distribution;
    WassersteinDistance => "wasserstein_distance", Distribution;
    JensenShannonDivergence => "jensen_shannon_divergence", Distribution;
    KlDiv => "kl_div", Distribution;
}

impl MetricKind {
    /// Compute the family over `y_true` and `y_pred`.
    pub fn compute(
        &self,
        y_true: &ArrayD<f64>,
        y_pred: &ArrayD<f64>,
        options: &MetricOptions,
        args: &MetricArgs,
    ) -> Result<Metrics> {
        let label_type = options.label_type;
        match self {
            Self::Accuracy => m::accuracy(y_true, y_pred, args),
            Self::BalancedAccuracy => m::balanced_accuracy(y_true, y_pred, args),
            Self::Precision => m::precision(y_true, y_pred, label_type, args),
            Self::Recall => m::recall(y_true, y_pred, label_type, args),
            Self::FbetaScore => m::fbeta_score(y_true, y_pred, &options.betas, label_type, args),
            Self::Jaccard => m::jaccard(y_true, y_pred, label_type, args),
            Self::ConfusionMatrix => m::confusion_matrix(y_true, y_pred, label_type, args),
            Self::RocAuc => m::roc_auc(y_true, y_pred, label_type, args),
            Self::AveragePrecision => m::average_precision(y_true, y_pred, label_type, args),
            Self::TopKAccuracy => m::top_k_accuracy(y_true, y_pred, &options.k, label_type, args),
            Self::Ndcg => m::ndcg(y_true, y_pred, options.ndcg_k, args),
            Self::MeanAbsoluteError => m::mean_absolute_error(y_true, y_pred, args),
            Self::MedianAbsoluteError => m::median_absolute_error(y_true, y_pred, args),
            Self::MeanAbsolutePercentageError => {
                m::mean_absolute_percentage_error(y_true, y_pred, args)
            }
            Self::MeanSquaredError => m::mean_squared_error(y_true, y_pred, args),
            Self::MeanSquaredLogError => m::mean_squared_log_error(y_true, y_pred, args),
            Self::RootMeanSquaredError => m::root_mean_squared_error(y_true, y_pred, args),
            Self::R2Score => m::r2_score(y_true, y_pred, args),
            Self::MeanTweedieDeviance => {
                m::mean_tweedie_deviance(y_true, y_pred, &options.powers, args)
            }
            Self::RegressionErrors => m::regression_errors(y_true, y_pred, args),
            Self::Pearson => m::pearsonr(y_true, y_pred, args),
            Self::Spearman => m::spearmanr(y_true, y_pred, args),
            Self::EnergyDistance => m::energy_distance(y_true, y_pred, args),
            Self::WassersteinDistance => m::wasserstein_distance(y_true, y_pred, args),
            Self::JensenShannonDivergence => m::jensen_shannon_divergence(y_true, y_pred, args),
            Self::KlDiv => m::kl_div(y_true, y_pred, args),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MetricKind {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| CoreError::InvalidConfig(format!("Unknown metric: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<_> = MetricKind::ALL.iter().map(MetricKind::tag).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), MetricKind::ALL.len());
    }

    #[test]
    fn test_parse_metric_kind() {
        assert_eq!("roc_auc".parse::<MetricKind>().unwrap(), MetricKind::RocAuc);
        assert_eq!(MetricKind::Pearson.to_string(), "pearsonr");
        assert!("auc".parse::<MetricKind>().unwrap_err().is_config_error());
    }

    #[test]
    fn test_capabilities() {
        assert_eq!(MetricKind::Ndcg.capability(), Capability::Ranking);
        assert_eq!(MetricKind::KlDiv.capability(), Capability::Distribution);
        assert_eq!(MetricKind::R2Score.capability(), Capability::Regression);
    }

    #[test]
    fn test_compute_precision() {
        let options = MetricOptions {
            label_type: LabelType::Binary,
            ..MetricOptions::default()
        };
        let out = MetricKind::Precision
            .compute(
                &array![1.0, 0.0, 0.0, 1.0].into_dyn(),
                &array![1.0, 0.0, 1.0, 0.0].into_dyn(),
                &options,
                &MetricArgs::new(),
            )
            .unwrap();
        assert_eq!(out.count("count"), Some(4));
        assert_eq!(out.scalar("precision"), Some(0.5));
    }

    #[test]
    fn test_compute_uses_options() {
        let y = array![1.0, 2.0, 3.0].into_dyn();
        let options = MetricOptions {
            powers: vec![1.0, 2.0],
            ..MetricOptions::default()
        };
        let out = MetricKind::MeanTweedieDeviance
            .compute(&y, &y, &options, &MetricArgs::new())
            .unwrap();
        assert!(out.contains_key("mean_tweedie_deviance_power_1"));
        assert!(out.contains_key("mean_tweedie_deviance_power_2"));
    }

    #[test]
    fn test_options_deserialize_defaults() {
        let options: MetricOptions = serde_json::from_str(r#"{"betas": [0.5, 2]}"#).unwrap();
        assert_eq!(options.betas, vec![0.5, 2.0]);
        assert_eq!(options.k, vec![2]);
        assert_eq!(options.label_type, LabelType::Auto);
    }
}
