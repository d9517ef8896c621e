//! Analyzers: from keyed data to an output.

use std::fmt;

use rayon::prelude::*;
use tracing::info;

use evalkit_core::{check_missing_keys, find_missing_keys, MissingPolicy, NanPolicy};

use crate::content::TextContent;
use crate::data::DataSource;
use crate::error::Result;
use crate::evaluator::{MetricsEvaluator, StateEvaluator};
use crate::metric::{MetricKind, MetricOptions};
use crate::output::Output;
use crate::state::EvaluationState;

/// Given validated data, produce an [`Output`].
pub trait Analyze: fmt::Debug + fmt::Display + Send + Sync {
    /// Analyze `data`. The output is materialized unless `lazy`.
    fn analyze(&self, data: &dyn DataSource, lazy: bool) -> Result<Output>;

    /// Keys this analyzer reads.
    fn required_keys(&self) -> Vec<String>;
}

/// Apply `policy` to the required keys: `true` means the analysis must be
/// skipped, `Err` that the policy raised.
///
/// At most one warning is emitted, by the key check itself.
pub fn skip_missing_keys(
    analyzer: &dyn fmt::Display,
    data: &dyn DataSource,
    keys: &[String],
    policy: MissingPolicy,
) -> Result<bool> {
    check_missing_keys(data, keys, policy)?;
    let missing = find_missing_keys(data, keys);
    if missing.is_empty() {
        return Ok(false);
    }
    info!("Skipping {analyzer} because of missing keys: {missing:?}");
    Ok(true)
}

fn finish(output: Output, lazy: bool) -> Result<Output> {
    if lazy {
        Ok(output)
    } else {
        output.compute()
    }
}

/// Computes one metric family over a `(y_true, y_pred)` pair of columns.
///
/// # Example
///
/// ```rust
/// use evalkit_core::{objects_are_equal, MissingPolicy};
/// use evalkit_eval::{Analyze, Columns, MetricAnalyzer, MetricKind, Output};
///
/// let data = Columns::from_json_str(r#"{"target": [1, 0, 0, 1], "pred": [1, 0, 1, 0]}"#).unwrap();
/// let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "target", "pred");
/// let output = analyzer.analyze(&data, false).unwrap();
/// let metrics = output.evaluator().evaluate("", "").unwrap();
/// assert_eq!(metrics.scalar("accuracy"), Some(0.5));
///
/// let missing = MetricAnalyzer::new(MetricKind::Accuracy, "label", "pred")
///     .with_missing_policy(MissingPolicy::Ignore);
/// assert!(objects_are_equal(&missing.analyze(&data, true).unwrap(), &Output::empty(), false));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetricAnalyzer {
    kind: MetricKind,
    y_true: String,
    y_pred: String,
    missing_policy: MissingPolicy,
    nan_policy: NanPolicy,
    options: MetricOptions,
}

impl MetricAnalyzer {
    /// Analyzer of `kind` over the `y_true` and `y_pred` columns, raising on
    /// missing keys and propagating NaN.
    #[must_use]
    pub fn new(kind: MetricKind, y_true: impl Into<String>, y_pred: impl Into<String>) -> Self {
        Self {
            kind,
            y_true: y_true.into(),
            y_pred: y_pred.into(),
            missing_policy: MissingPolicy::default(),
            nan_policy: NanPolicy::default(),
            options: MetricOptions::default(),
        }
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

    /// Set the metric options.
    #[must_use]
    pub fn with_options(mut self, options: MetricOptions) -> Self {
        self.options = options;
        self
    }

    /// Metric family.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Missing-key policy.
    #[must_use]
    pub const fn missing_policy(&self) -> MissingPolicy {
        self.missing_policy
    }

    /// NaN policy.
    #[must_use]
    pub const fn nan_policy(&self) -> NanPolicy {
        self.nan_policy
    }
}

impl fmt::Display for MetricAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MetricAnalyzer(metric={}, y_true='{}', y_pred='{}', missing_policy='{}', nan_policy='{}')",
            self.kind, self.y_true, self.y_pred, self.missing_policy, self.nan_policy
        )
    }
}

impl Analyze for MetricAnalyzer {
    fn analyze(&self, data: &dyn DataSource, lazy: bool) -> Result<Output> {
        if skip_missing_keys(self, data, &self.required_keys(), self.missing_policy)? {
            return Ok(Output::empty());
        }
        let state = EvaluationState::new(
            data.column(&self.y_true)?,
            data.column(&self.y_pred)?,
            self.y_true.as_str(),
            self.y_pred.as_str(),
            self.nan_policy,
        )?;
        let content = TextContent::new(format!(
            "{} of '{}' against '{}'",
            self.kind, self.y_pred, self.y_true
        ));
        let evaluator = StateEvaluator::with_options(self.kind, self.options.clone(), state);
        finish(Output::new(evaluator, content), lazy)
    }

    fn required_keys(&self) -> Vec<String> {
        vec![self.y_true.clone(), self.y_pred.clone()]
    }
}

/// Returns fixed content with an empty evaluator, whatever the data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentAnalyzer {
    content: TextContent,
}

impl ContentAnalyzer {
    /// Analyzer returning `content`.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: TextContent::new(content),
        }
    }
}

impl fmt::Display for ContentAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAnalyzer({})", self.content)
    }
}

impl Analyze for ContentAnalyzer {
    fn analyze(&self, _data: &dyn DataSource, lazy: bool) -> Result<Output> {
        finish(
            Output::new(MetricsEvaluator::empty(), self.content.clone()),
            lazy,
        )
    }

    fn required_keys(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Run independent analyzers in parallel, returning the outputs in order.
///
/// Fails if any analyzer fails.
pub fn analyze_many(
    analyzers: &[Box<dyn Analyze>],
    data: &dyn DataSource,
    lazy: bool,
) -> Result<Vec<Output>> {
    analyzers
        .par_iter()
        .map(|analyzer| analyzer.analyze(data, lazy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalkit_core::testing::capture_logs;
    use evalkit_core::{objects_are_equal, CoreError};
    use ndarray::array;
    use tracing::Level;

    use crate::{Columns, EvalError};

    fn data() -> Columns {
        [
            ("target", array![1.0, 0.0, 0.0, 1.0, 1.0].into_dyn()),
            ("pred", array![1.0, 0.0, 1.0, 0.0, 1.0].into_dyn()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_metric_analyzer_lazy() {
        let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "target", "pred");
        let output = analyzer.analyze(&data(), true).unwrap();
        assert!(output.evaluator().to_string().starts_with("StateEvaluator"));
        let metrics = output.evaluator().evaluate("", "").unwrap();
        assert_eq!(metrics.scalar("accuracy"), Some(0.6));
    }

    #[test]
    fn test_metric_analyzer_eager_equals_compute() {
        let analyzer = MetricAnalyzer::new(MetricKind::Precision, "target", "pred");
        let eager = analyzer.analyze(&data(), false).unwrap();
        let lazy = analyzer.analyze(&data(), true).unwrap().compute().unwrap();
        assert!(objects_are_equal(&eager, &lazy, false));
        assert_eq!(eager.evaluator().to_string(), "MetricsEvaluator(count=2)");
    }

    #[test]
    fn test_missing_key_warn() {
        let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "target", "pred")
            .with_missing_policy(MissingPolicy::Warn);
        let mut data = Columns::new();
        data.insert("pred", array![1.0, 0.0].into_dyn());
        let (output, logs) = capture_logs(|| analyzer.analyze(&data, true));
        let warnings = logs.at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'target'"));
        assert!(objects_are_equal(&output.unwrap(), &Output::empty(), false));
    }

    #[test]
    fn test_missing_key_ignore_is_silent() {
        let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "label", "pred")
            .with_missing_policy(MissingPolicy::Ignore);
        let (output, logs) = capture_logs(|| analyzer.analyze(&data(), false));
        assert!(logs.at(Level::WARN).is_empty());
        assert!(objects_are_equal(&output.unwrap(), &Output::empty(), false));
    }

    #[test]
    fn test_missing_key_raise() {
        let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "label", "score");
        let err = analyzer.analyze(&data(), true).unwrap_err();
        assert!(matches!(
            err,
            EvalError::Core(CoreError::KeyNotFound(ref msg))
                if msg == "2 keys are missing in the data: ['label', 'score']"
        ));
    }

    #[test]
    fn test_shape_mismatch_fails_at_analyze() {
        let mut data = data();
        data.insert("short", array![1.0, 0.0].into_dyn());
        let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "target", "short");
        let err = analyzer.analyze(&data, true).unwrap_err();
        assert!(matches!(err, EvalError::Core(CoreError::ShapeMismatch(_))));
    }

    #[test]
    fn test_content_analyzer() {
        let analyzer = ContentAnalyzer::new("summary");
        let output = analyzer.analyze(&Columns::new(), false).unwrap();
        assert!(analyzer.required_keys().is_empty());
        assert_eq!(output.content().generate_content().unwrap(), "summary");
        assert!(output.evaluator().evaluate("", "").unwrap().is_empty());
    }

    #[test]
    fn test_analyze_many_keeps_order() {
        let analyzers: Vec<Box<dyn Analyze>> = vec![
            Box::new(MetricAnalyzer::new(MetricKind::Accuracy, "target", "pred")),
            Box::new(ContentAnalyzer::new("x")),
            Box::new(MetricAnalyzer::new(MetricKind::MeanSquaredError, "target", "pred")),
        ];
        let outputs = analyze_many(&analyzers, &data(), false).unwrap();
        assert_eq!(outputs.len(), 3);
        let metrics = outputs[2].evaluator().evaluate("", "").unwrap();
        assert_eq!(metrics.scalar("mean_squared_error"), Some(0.4));
        assert_eq!(outputs[1].content().generate_content().unwrap(), "x");
    }

    #[test]
    fn test_analyzer_display() {
        let analyzer = MetricAnalyzer::new(MetricKind::RocAuc, "target", "score")
            .with_nan_policy(NanPolicy::Omit);
        assert_eq!(
            analyzer.to_string(),
            "MetricAnalyzer(metric=roc_auc, y_true='target', y_pred='score', missing_policy='raise', nan_policy='omit')"
        );
    }
}
