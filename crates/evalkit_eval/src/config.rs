//! Declarative analyzer configuration.
//!
//! An [`AnalyzerConfig`] names a registered analyzer tag and carries everything
//! needed to build it. Configurations are read from JSON, either as a single
//! object or as a list of objects.
//!
//! ```rust
//! use evalkit_eval::AnalyzerConfig;
//!
//! let configs = AnalyzerConfig::list_from_json_str(
//!     r#"[{"analyzer": "accuracy", "y_true": "target", "y_pred": "pred"},
//!         {"analyzer": "fbeta_score", "y_true": "target", "y_pred": "pred", "betas": [0.5, 2]}]"#,
//! )
//! .unwrap();
//! assert_eq!(configs.len(), 2);
//! assert_eq!(configs[1].options.betas, vec![0.5, 2.0]);
//! ```

use evalkit_core::{CoreError, MissingPolicy, NanPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::metric::MetricOptions;

/// Configuration of a single analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Registered analyzer tag.
    pub analyzer: String,
    /// Key of the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_true: Option<String>,
    /// Key of the predictions or scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_pred: Option<String>,
    /// What to do when a key is missing.
    #[serde(default)]
    pub missing_policy: MissingPolicy,
    /// What to do with NaN values.
    #[serde(default)]
    pub nan_policy: NanPolicy,
    /// Fixed text of content analyzers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Metric options.
    #[serde(flatten)]
    pub options: MetricOptions,
}

impl AnalyzerConfig {
    /// Config of analyzer `tag` with default policies and options.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            analyzer: tag.into(),
            y_true: None,
            y_pred: None,
            missing_policy: MissingPolicy::default(),
            nan_policy: NanPolicy::default(),
            text: None,
            options: MetricOptions::default(),
        }
    }

    /// Set the two column keys.
    #[must_use]
    pub fn with_keys(mut self, y_true: impl Into<String>, y_pred: impl Into<String>) -> Self {
        self.y_true = Some(y_true.into());
        self.y_pred = Some(y_pred.into());
        self
    }

    /// Set the missing-key policy.
    #[must_use]
    pub fn with_missing_policy(mut self, missing_policy: MissingPolicy) -> Self {
        self.missing_policy = missing_policy;
        self
    }

    /// Set the NaN policy.
    #[must_use]
    pub fn with_nan_policy(mut self, nan_policy: NanPolicy) -> Self {
        self.nan_policy = nan_policy;
        self
    }

    /// Parse one configuration object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a configuration object or a list of them.
    pub fn list_from_json_str(json: &str) -> Result<Vec<Self>> {
        Self::list_from_value(serde_json::from_str(json)?)
    }

    /// Interpret `value` as a configuration object or a list of them.
    pub fn list_from_value(value: Value) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| Ok(serde_json::from_value(item)?))
                .collect(),
            other => Ok(vec![serde_json::from_value(other)?]),
        }
    }

    /// The `(y_true, y_pred)` keys, required by every metric analyzer.
    pub fn keys(&self) -> Result<(&str, &str)> {
        Ok((
            self.required(self.y_true.as_deref(), "y_true")?,
            self.required(self.y_pred.as_deref(), "y_pred")?,
        ))
    }

    fn required<'a>(&self, value: Option<&'a str>, name: &str) -> Result<&'a str> {
        value.ok_or_else(|| {
            CoreError::InvalidConfig(format!("analyzer '{}' requires '{name}'", self.analyzer))
                .into()
        })
    }
}

/// Whether `value` looks like an analyzer configuration: an object with a
/// string `analyzer` field.
#[must_use]
pub fn is_analyzer_config(value: &Value) -> bool {
    value.get("analyzer").map_or(false, Value::is_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvalError;
    use evalkit_metrics::LabelType;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::from_json_str(r#"{"analyzer": "accuracy"}"#).unwrap();
        assert_eq!(config, AnalyzerConfig::new("accuracy"));
        assert_eq!(config.missing_policy, MissingPolicy::Raise);
        assert_eq!(config.nan_policy, NanPolicy::Propagate);
        assert_eq!(config.options.label_type, LabelType::Auto);
        assert_eq!(config.options.k, vec![2]);
    }

    #[test]
    fn test_full_config() {
        let config = AnalyzerConfig::from_json_str(
            r#"{"analyzer": "top_k_accuracy", "y_true": "target", "y_pred": "score",
                "missing_policy": "warn", "nan_policy": "omit", "label_type": "multiclass",
                "k": [1, 3]}"#,
        )
        .unwrap();
        assert_eq!(config.keys().unwrap(), ("target", "score"));
        assert_eq!(config.missing_policy, MissingPolicy::Warn);
        assert_eq!(config.nan_policy, NanPolicy::Omit);
        assert_eq!(config.options.label_type, LabelType::Multiclass);
        assert_eq!(config.options.k, vec![1, 3]);
    }

    #[test]
    fn test_invalid_policy() {
        let err = AnalyzerConfig::from_json_str(r#"{"analyzer": "accuracy", "nan_policy": "drop"}"#)
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("Incorrect 'nan_policy': drop"));
    }

    #[test]
    fn test_missing_keys() {
        let err = AnalyzerConfig::new("accuracy").keys().unwrap_err();
        assert!(matches!(
            err,
            EvalError::Core(CoreError::InvalidConfig(ref msg)) if msg == "analyzer 'accuracy' requires 'y_true'"
        ));
    }

    #[test]
    fn test_list_accepts_single_object() {
        let configs = AnalyzerConfig::list_from_json_str(r#"{"analyzer": "content", "text": "hi"}"#)
            .unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].text.as_deref(), Some("hi"));
    }

    #[test]
    fn test_is_analyzer_config() {
        assert!(is_analyzer_config(&json!({"analyzer": "accuracy"})));
        assert!(!is_analyzer_config(&json!({"analyzer": 3})));
        assert!(!is_analyzer_config(&json!([1, 2])));
        assert!(!is_analyzer_config(&json!({"y_true": "target"})));
    }
}
