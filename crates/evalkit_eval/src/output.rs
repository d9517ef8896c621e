//! Outputs pairing an evaluator with report content.

use std::any::Any;
use std::fmt;

use evalkit_core::{Category, Comparable, EqualityContext};

use crate::content::{ContentGenerator, TextContent};
use crate::error::Result;
use crate::evaluator::{Evaluate, MetricsEvaluator};

/// An evaluator and a content generator with synchronized lazy/eager access.
///
/// Two outputs are equal when both their evaluators and their contents are.
///
/// # Example
///
/// ```rust
/// use evalkit_core::{objects_are_equal, Metrics};
/// use evalkit_eval::{MetricsEvaluator, Output, TextContent};
///
/// let metrics: Metrics = [("accuracy", 1.0)].into_iter().collect();
/// let output = Output::new(MetricsEvaluator::new(metrics), TextContent::new("ok"));
/// let computed = output.compute().unwrap();
/// assert!(objects_are_equal(&output, &computed, false));
/// assert!(!objects_are_equal(&output, &Output::empty(), false));
/// ```
#[derive(Debug, Clone)]
pub struct Output {
    evaluator: Box<dyn Evaluate>,
    content: Box<dyn ContentGenerator>,
}

impl Output {
    /// Pair an evaluator with content.
    #[must_use]
    pub fn new(
        evaluator: impl Evaluate + 'static,
        content: impl ContentGenerator + 'static,
    ) -> Self {
        Self::from_boxed(Box::new(evaluator), Box::new(content))
    }

    /// Pair already boxed components.
    #[must_use]
    pub fn from_boxed(evaluator: Box<dyn Evaluate>, content: Box<dyn ContentGenerator>) -> Self {
        Self { evaluator, content }
    }

    /// The canonical output without metrics or content, returned when the
    /// required data is missing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(MetricsEvaluator::empty(), TextContent::empty())
    }

    /// The evaluator: as held when `lazy`, materialized otherwise.
    pub fn get_evaluator(&self, lazy: bool) -> Result<Box<dyn Evaluate>> {
        if lazy {
            Ok(self.evaluator.clone())
        } else {
            Ok(Box::new(self.evaluator.compute()?))
        }
    }

    /// The content generator: as held when `lazy`, materialized otherwise.
    pub fn get_content_generator(&self, lazy: bool) -> Result<Box<dyn ContentGenerator>> {
        if lazy {
            Ok(self.content.clone())
        } else {
            self.content.compute()
        }
    }

    /// Borrow the evaluator.
    #[must_use]
    pub fn evaluator(&self) -> &dyn Evaluate {
        self.evaluator.as_ref()
    }

    /// Borrow the content generator.
    #[must_use]
    pub fn content(&self) -> &dyn ContentGenerator {
        self.content.as_ref()
    }

    /// A new output with both evaluator and content materialized.
    pub fn compute(&self) -> Result<Output> {
        Ok(Self::from_boxed(
            Box::new(self.evaluator.compute()?),
            self.content.compute()?,
        ))
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Output(evaluator={}, content={:?})", self.evaluator, self.content)
    }
}

impl Comparable for Output {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Output
    }

    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| {
            ctx.equal(self.evaluator.as_comparable(), o.evaluator.as_comparable())
                && ctx.equal(self.content.as_comparable(), o.content.as_comparable())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalkit_core::{objects_are_equal, NanPolicy};
    use ndarray::array;

    use crate::{EvaluationState, MetricKind, StateEvaluator};

    fn evaluator() -> StateEvaluator {
        let state = EvaluationState::new(
            array![1.0, 0.0, 0.0, 1.0].into_dyn(),
            array![1.0, 0.0, 1.0, 0.0].into_dyn(),
            "target",
            "pred",
            NanPolicy::Propagate,
        )
        .unwrap();
        StateEvaluator::new(MetricKind::Accuracy, state)
    }

    #[test]
    fn test_output_round_trip() {
        let output = Output::new(evaluator(), TextContent::new("accuracy"));
        let lazy = output.compute().unwrap().get_evaluator(true).unwrap();
        let expected = evaluator().compute().unwrap();
        assert!(objects_are_equal(lazy.as_comparable(), &expected, false));
    }

    #[test]
    fn test_get_evaluator_lazy_and_eager() {
        let output = Output::new(evaluator(), TextContent::empty());
        let lazy = output.get_evaluator(true).unwrap();
        let eager = output.get_evaluator(false).unwrap();
        assert!(objects_are_equal(lazy.as_comparable(), &evaluator(), false));
        assert!(lazy.to_string().starts_with("StateEvaluator"));
        assert_eq!(eager.to_string(), "MetricsEvaluator(count=5)");
    }

    #[test]
    fn test_get_content_generator() {
        let output = Output::new(evaluator(), TextContent::new("x"));
        for lazy in [true, false] {
            let content = output.get_content_generator(lazy).unwrap();
            assert_eq!(content.generate_content().unwrap(), "x");
        }
    }

    #[test]
    fn test_output_compute_is_idempotent() {
        let once = Output::new(evaluator(), TextContent::new("x")).compute().unwrap();
        let twice = once.compute().unwrap();
        assert!(objects_are_equal(&once, &twice, false));
    }

    #[test]
    fn test_output_equality() {
        let a = Output::new(evaluator(), TextContent::new("x"));
        let b = Output::new(evaluator(), TextContent::new("y"));
        assert!(objects_are_equal(&a, &a.clone(), false));
        assert!(!objects_are_equal(&a, &b, false));
        assert!(objects_are_equal(&Output::empty(), &Output::default(), false));
        assert!(!objects_are_equal(&a, &1.0_f64, false));
    }

    #[test]
    fn test_output_equal_method() {
        let a = Output::new(evaluator(), TextContent::new("x"));
        assert!(!a.equal(&a.compute().unwrap(), false));
        assert!(a.compute().unwrap().equal(&a.compute().unwrap(), false));
        assert!(Output::empty().equal(&Output::default(), false));
        assert!(!a.equal(&TextContent::new("x"), true));
    }

    #[test]
    fn test_empty_output_evaluates_to_nothing() {
        let metrics = Output::empty().evaluator().evaluate("", "").unwrap();
        assert!(metrics.is_empty());
    }
}
