//! Lazy and materialized metric evaluators.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use evalkit_core::{
    objects_are_allclose, Category, Comparable, EqualityContext, Metrics,
};
use evalkit_metrics::MetricArgs;

use crate::error::Result;
use crate::metric::{MetricKind, MetricOptions};
use crate::state::EvaluationState;

/// Turns a recipe or a cached mapping into metrics.
///
/// `evaluate` never mutates the evaluator: each call re-derives the mapping.
/// `compute` returns a [`MetricsEvaluator`] holding the materialized mapping,
/// decoupled from any [`EvaluationState`].
pub trait Evaluate: Comparable + fmt::Display + Send + Sync {
    /// Metrics with every key decorated by `prefix` and `suffix`.
    fn evaluate(&self, prefix: &str, suffix: &str) -> Result<Metrics>;

    /// Materialize the metrics.
    fn compute(&self) -> Result<MetricsEvaluator>;

    /// Clone behind a box.
    fn boxed_clone(&self) -> Box<dyn Evaluate>;

    /// View as a comparable value.
    fn as_comparable(&self) -> &dyn Comparable;
}

impl Clone for Box<dyn Evaluate> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Evaluator over a fixed metrics mapping.
///
/// # Example
///
/// ```rust
/// use evalkit_core::Metrics;
/// use evalkit_eval::{Evaluate, MetricsEvaluator};
///
/// let metrics: Metrics = [("accuracy", 0.5)].into_iter().collect();
/// let evaluator = MetricsEvaluator::new(metrics);
/// let out = evaluator.evaluate("val_", "").unwrap();
/// assert_eq!(out.scalar("val_accuracy"), Some(0.5));
/// assert_eq!(evaluator.to_string(), "MetricsEvaluator(count=1)");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsEvaluator {
    metrics: Metrics,
}

impl MetricsEvaluator {
    /// Wrap a mapping.
    #[must_use]
    pub const fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }

    /// Evaluator without any metric.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The undecorated mapping.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Whether both mappings match within `|a - b| <= atol + rtol * |b|`.
    #[must_use]
    pub fn allclose(&self, other: &Self, rtol: f64, atol: f64, equal_nan: bool) -> bool {
        objects_are_allclose(&self.metrics, &other.metrics, rtol, atol, equal_nan)
    }
}

impl fmt::Display for MetricsEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetricsEvaluator(count={})", self.metrics.len())
    }
}

impl Comparable for MetricsEvaluator {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Evaluator
    }

    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| ctx.equal(&self.metrics, &o.metrics))
    }
}

impl Evaluate for MetricsEvaluator {
    fn evaluate(&self, prefix: &str, suffix: &str) -> Result<Metrics> {
        Ok(self.metrics.decorate(prefix, suffix))
    }

    fn compute(&self) -> Result<MetricsEvaluator> {
        Ok(self.clone())
    }

    fn boxed_clone(&self) -> Box<dyn Evaluate> {
        Box::new(self.clone())
    }

    fn as_comparable(&self) -> &dyn Comparable {
        self
    }
}

/// Evaluator binding a metric family and its options to a shared state.
#[derive(Debug, Clone)]
pub struct StateEvaluator {
    kind: MetricKind,
    options: MetricOptions,
    state: Arc<EvaluationState>,
}

impl StateEvaluator {
    /// Bind `kind` to `state` with default options.
    #[must_use]
    pub fn new(kind: MetricKind, state: impl Into<Arc<EvaluationState>>) -> Self {
        Self::with_options(kind, MetricOptions::default(), state)
    }

    /// Bind `kind` to `state` with explicit options.
    #[must_use]
    pub fn with_options(
        kind: MetricKind,
        options: MetricOptions,
        state: impl Into<Arc<EvaluationState>>,
    ) -> Self {
        Self {
            kind,
            options,
            state: state.into(),
        }
    }

    /// Metric family.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Metric options.
    #[must_use]
    pub const fn options(&self) -> &MetricOptions {
        &self.options
    }

    /// The bound state.
    #[must_use]
    pub fn state(&self) -> &EvaluationState {
        &self.state
    }
}

impl fmt::Display for StateEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateEvaluator(metric={}, state={})", self.kind, self.state)
    }
}

impl Comparable for StateEvaluator {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Evaluator
    }

    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| {
            self.kind == o.kind
                && self.options == o.options
                && ctx.equal(self.state.as_ref(), o.state.as_ref())
        })
    }
}

impl Evaluate for StateEvaluator {
    fn evaluate(&self, prefix: &str, suffix: &str) -> Result<Metrics> {
        debug!(metric = %self.kind, state = %self.state, "evaluating");
        let args = MetricArgs::new()
            .with_prefix(prefix)
            .with_suffix(suffix)
            .with_nan_policy(self.state.nan_policy());
        Ok(self
            .kind
            .compute(self.state.y_true(), self.state.y_pred(), &self.options, &args)?)
    }

    fn compute(&self) -> Result<MetricsEvaluator> {
        Ok(MetricsEvaluator::new(self.evaluate("", "")?))
    }

    fn boxed_clone(&self) -> Box<dyn Evaluate> {
        Box::new(self.clone())
    }

    fn as_comparable(&self) -> &dyn Comparable {
        self
    }
}
