//! Immutable snapshot of the arrays a metric is computed over.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use ndarray::ArrayD;

use evalkit_core::array::{check_same_shape_named, shape_str};
use evalkit_core::{Category, Comparable, EqualityContext, NanPolicy, Result};

/// Ground-truth and predicted arrays with their source names and NaN policy.
///
/// Both arrays must share one shape; this is checked at construction. The
/// arrays sit behind [`Arc`], so clones and the evaluators built on a state
/// share the buffers.
///
/// # Example
///
/// ```rust
/// use evalkit_core::NanPolicy;
/// use evalkit_eval::EvaluationState;
/// use ndarray::array;
///
/// let state = EvaluationState::new(
///     array![1.0, 0.0, 1.0].into_dyn(),
///     array![1.0, 1.0, 1.0].into_dyn(),
///     "target",
///     "pred",
///     NanPolicy::Propagate,
/// )
/// .unwrap();
/// assert_eq!(state.y_true_name(), "target");
/// assert!(EvaluationState::new(
///     array![1.0].into_dyn(),
///     array![1.0, 0.0].into_dyn(),
///     "target",
///     "pred",
///     NanPolicy::Propagate,
/// )
/// .is_err());
/// ```
#[derive(Debug, Clone)]
pub struct EvaluationState {
    y_true: Arc<ArrayD<f64>>,
    y_pred: Arc<ArrayD<f64>>,
    y_true_name: String,
    y_pred_name: String,
    nan_policy: NanPolicy,
}

impl EvaluationState {
    /// Create a state, failing with `ShapeMismatch` when the shapes differ.
    pub fn new(
        y_true: ArrayD<f64>,
        y_pred: ArrayD<f64>,
        y_true_name: impl Into<String>,
        y_pred_name: impl Into<String>,
        nan_policy: NanPolicy,
    ) -> Result<Self> {
        Self::from_shared(
            Arc::new(y_true),
            Arc::new(y_pred),
            y_true_name.into(),
            y_pred_name.into(),
            nan_policy,
        )
    }

    fn from_shared(
        y_true: Arc<ArrayD<f64>>,
        y_pred: Arc<ArrayD<f64>>,
        y_true_name: String,
        y_pred_name: String,
        nan_policy: NanPolicy,
    ) -> Result<Self> {
        check_same_shape_named(&y_true_name, &y_true, &y_pred_name, &y_pred)?;
        Ok(Self {
            y_true,
            y_pred,
            y_true_name,
            y_pred_name,
            nan_policy,
        })
    }

    /// Ground-truth array.
    #[must_use]
    pub fn y_true(&self) -> &ArrayD<f64> {
        &self.y_true
    }

    /// Predicted array (labels, scores or a second sample).
    #[must_use]
    pub fn y_pred(&self) -> &ArrayD<f64> {
        &self.y_pred
    }

    /// Source key of the ground truth.
    #[must_use]
    pub fn y_true_name(&self) -> &str {
        &self.y_true_name
    }

    /// Source key of the prediction.
    #[must_use]
    pub fn y_pred_name(&self) -> &str {
        &self.y_pred_name
    }

    /// NaN handling applied by every metric computed on this state.
    #[must_use]
    pub const fn nan_policy(&self) -> NanPolicy {
        self.nan_policy
    }

    /// Start a copy of this state with some fields substituted.
    ///
    /// ```rust
    /// use evalkit_core::NanPolicy;
    /// use evalkit_eval::EvaluationState;
    /// use ndarray::array;
    ///
    /// let state = EvaluationState::new(
    ///     array![1.0, 0.0].into_dyn(),
    ///     array![1.0, 1.0].into_dyn(),
    ///     "target",
    ///     "pred",
    ///     NanPolicy::Propagate,
    /// )
    /// .unwrap();
    /// let omit = state.clone_with().nan_policy(NanPolicy::Omit).build().unwrap();
    /// assert_eq!(omit.nan_policy(), NanPolicy::Omit);
    /// assert_eq!(omit.y_true(), state.y_true());
    /// ```
    #[must_use]
    pub fn clone_with(&self) -> StateBuilder {
        StateBuilder {
            y_true: Arc::new(self.y_true.as_ref().clone()),
            y_pred: Arc::new(self.y_pred.as_ref().clone()),
            y_true_name: self.y_true_name.clone(),
            y_pred_name: self.y_pred_name.clone(),
            nan_policy: self.nan_policy,
        }
    }
}

impl fmt::Display for EvaluationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EvaluationState(y_true={}, y_pred={}, y_true_name='{}', y_pred_name='{}', nan_policy='{}')",
            shape_str(self.y_true.shape()),
            shape_str(self.y_pred.shape()),
            self.y_true_name,
            self.y_pred_name,
            self.nan_policy
        )
    }
}

impl Comparable for EvaluationState {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::State
    }

    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        self.y_true_name == other.y_true_name
            && self.y_pred_name == other.y_pred_name
            && self.nan_policy == other.nan_policy
            && ctx.equal(self.y_true.as_ref(), other.y_true.as_ref())
            && ctx.equal(self.y_pred.as_ref(), other.y_pred.as_ref())
    }
}

/// Deep copy of an [`EvaluationState`] under construction, revalidated by [`StateBuilder::build`].
#[derive(Debug, Clone)]
#[must_use]
pub struct StateBuilder {
    y_true: Arc<ArrayD<f64>>,
    y_pred: Arc<ArrayD<f64>>,
    y_true_name: String,
    y_pred_name: String,
    nan_policy: NanPolicy,
}

impl StateBuilder {
    /// Replace the ground-truth array.
    pub fn y_true(mut self, y_true: ArrayD<f64>) -> Self {
        self.y_true = Arc::new(y_true);
        self
    }

    /// Replace the predicted array.
    pub fn y_pred(mut self, y_pred: ArrayD<f64>) -> Self {
        self.y_pred = Arc::new(y_pred);
        self
    }

    /// Replace the ground-truth name.
    pub fn y_true_name(mut self, name: impl Into<String>) -> Self {
        self.y_true_name = name.into();
        self
    }

    /// Replace the prediction name.
    pub fn y_pred_name(mut self, name: impl Into<String>) -> Self {
        self.y_pred_name = name.into();
        self
    }

    /// Replace the NaN policy.
    pub fn nan_policy(mut self, nan_policy: NanPolicy) -> Self {
        self.nan_policy = nan_policy;
        self
    }

    /// Validate shapes and create the state.
    pub fn build(self) -> Result<EvaluationState> {
        EvaluationState::from_shared(
            self.y_true,
            self.y_pred,
            self.y_true_name,
            self.y_pred_name,
            self.nan_policy,
        )
    }
}
