//! Structural, NaN-aware equality.
//!
//! Values taking part in deep comparisons implement [`Comparable`]. An
//! [`EqualityContext`] maps each value [`Category`] to an
//! [`EqualityComparator`]; the default comparator runs a short-circuit chain
//! (same object, same category, same concrete type) before delegating to the
//! value's own [`Comparable::equal_to`].
//!
//! ```rust
//! use evalkit_core::{objects_are_equal, MetricValue};
//!
//! let a = MetricValue::Scalar(f64::NAN);
//! let b = MetricValue::Scalar(f64::NAN);
//! assert!(!objects_are_equal(&a, &b, false));
//! assert!(objects_are_equal(&a, &b, true));
//! assert!(!objects_are_equal(&a, &1.0_f64, true));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ndarray::ArrayD;
use tracing::info;

use crate::array::shape_str;
use crate::value::{MetricValue, Metrics};

/// Capability-level category of a comparable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Floating-point scalars.
    Scalar,
    /// Sample counts.
    Count,
    /// Strings.
    Text,
    /// Numeric arrays.
    Array,
    /// A single metric value.
    MetricValue,
    /// A metric mapping.
    Metrics,
    /// Evaluation states.
    State,
    /// Evaluators.
    Evaluator,
    /// Content generators.
    Content,
    /// Outputs.
    Output,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 10] = [
        Self::Scalar,
        Self::Count,
        Self::Text,
        Self::Array,
        Self::MetricValue,
        Self::Metrics,
        Self::State,
        Self::Evaluator,
        Self::Content,
        Self::Output,
    ];
}

/// A value that can take part in deep equality comparisons.
pub trait Comparable: fmt::Debug + Any {
    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Category used to select a comparator.
    fn category(&self) -> Category;

    /// Name of the concrete type, used in difference reports.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Compare against a value already known to share this concrete type.
    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool;

    /// Whether `self` equals `other` in a default context. Values of unrelated
    /// types are never equal.
    fn equal(&self, other: &dyn Comparable, equal_nan: bool) -> bool
    where
        Self: Sized,
    {
        objects_are_equal(self, other, equal_nan)
    }
}

/// Options of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EqualityConfig {
    /// Treat two NaN values as equal.
    pub equal_nan: bool,
    /// Log the first difference found at `info` level.
    pub show_difference: bool,
    /// `(rtol, atol)`: compare floats with a tolerance instead of exactly.
    pub tolerance: Option<(f64, f64)>,
}

/// Compares two values of one category.
pub trait EqualityComparator: Send + Sync {
    /// Whether `actual` equals `expected`.
    fn equal(&self, actual: &dyn Comparable, expected: &dyn Comparable, ctx: &EqualityContext)
        -> bool;
}

/// One link of a comparator chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Equal when both sides are the same object.
    SameObject,
    /// Unequal when the categories differ.
    SameCategory,
    /// Unequal when the concrete types differ.
    SameType,
}

impl Handler {
    fn handle(
        self,
        actual: &dyn Comparable,
        expected: &dyn Comparable,
        ctx: &EqualityContext,
    ) -> Option<bool> {
        match self {
            Self::SameObject => {
                let a = actual as *const dyn Comparable as *const ();
                let b = expected as *const dyn Comparable as *const ();
                std::ptr::eq(a, b).then_some(true)
            }
            Self::SameCategory => {
                if actual.category() == expected.category() {
                    return None;
                }
                ctx.report(format_args!(
                    "objects have different categories: {:?} vs {:?}",
                    actual.category(),
                    expected.category()
                ));
                Some(false)
            }
            Self::SameType => {
                if actual.as_any().type_id() == expected.as_any().type_id() {
                    return None;
                }
                ctx.report(format_args!(
                    "objects have different types: {} vs {}",
                    actual.type_name(),
                    expected.type_name()
                ));
                Some(false)
            }
        }
    }
}

/// Comparator running a handler chain, then [`Comparable::equal_to`].
#[derive(Debug, Clone)]
pub struct ChainComparator {
    handlers: Vec<Handler>,
}

impl ChainComparator {
    /// Build a comparator from an explicit chain.
    #[must_use]
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self { handlers }
    }
}

impl Default for ChainComparator {
    fn default() -> Self {
        Self::new(vec![Handler::SameObject, Handler::SameCategory, Handler::SameType])
    }
}

impl EqualityComparator for ChainComparator {
    fn equal(
        &self,
        actual: &dyn Comparable,
        expected: &dyn Comparable,
        ctx: &EqualityContext,
    ) -> bool {
        for handler in &self.handlers {
            if let Some(result) = handler.handle(actual, expected, ctx) {
                return result;
            }
        }
        if actual.as_any().type_id() != expected.as_any().type_id() {
            return false;
        }
        actual.equal_to(expected, ctx)
    }
}

/// Comparator registry plus the configuration of one comparison.
#[derive(Clone)]
pub struct EqualityContext {
    config: EqualityConfig,
    comparators: HashMap<Category, Arc<dyn EqualityComparator>>,
}

impl fmt::Debug for EqualityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut categories: Vec<_> = self.comparators.keys().collect();
        categories.sort_by_key(|c| format!("{c:?}"));
        f.debug_struct("EqualityContext")
            .field("config", &self.config)
            .field("categories", &categories)
            .finish()
    }
}

impl EqualityContext {
    /// A context with a [`ChainComparator`] for every category.
    #[must_use]
    pub fn new(config: EqualityConfig) -> Self {
        let mut ctx = Self::empty(config);
        let default: Arc<dyn EqualityComparator> = Arc::new(ChainComparator::default());
        for category in Category::ALL {
            ctx.comparators.insert(category, Arc::clone(&default));
        }
        ctx
    }

    /// A context without any comparator.
    #[must_use]
    pub fn empty(config: EqualityConfig) -> Self {
        Self {
            config,
            comparators: HashMap::new(),
        }
    }

    /// Exact comparison, with NaN equality selected by `equal_nan`.
    #[must_use]
    pub fn with_equal_nan(equal_nan: bool) -> Self {
        Self::new(EqualityConfig {
            equal_nan,
            ..EqualityConfig::default()
        })
    }

    /// Register or replace the comparator of a category.
    pub fn register(&mut self, category: Category, comparator: impl EqualityComparator + 'static) {
        self.comparators.insert(category, Arc::new(comparator));
    }

    /// Whether a category has a comparator.
    #[must_use]
    pub fn has_comparator(&self, category: Category) -> bool {
        self.comparators.contains_key(&category)
    }

    /// Options of this comparison.
    #[must_use]
    pub const fn config(&self) -> &EqualityConfig {
        &self.config
    }

    /// Whether two values are equal.
    ///
    /// Values whose category has no comparator are never equal.
    #[must_use]
    pub fn equal(&self, actual: &dyn Comparable, expected: &dyn Comparable) -> bool {
        match self.comparators.get(&actual.category()) {
            Some(comparator) => comparator.equal(actual, expected, self),
            None => {
                self.report(format_args!(
                    "no comparator registered for {:?}",
                    actual.category()
                ));
                false
            }
        }
    }

    /// Compare two floats under this configuration.
    #[must_use]
    pub fn equal_f64(&self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return self.config.equal_nan && a.is_nan() && b.is_nan();
        }
        if a == b {
            return true;
        }
        match self.config.tolerance {
            Some((rtol, atol)) if a.is_finite() && b.is_finite() => {
                (a - b).abs() <= atol + rtol * b.abs()
            }
            _ => false,
        }
    }

    /// Compare two arrays elementwise under this configuration.
    #[must_use]
    pub fn equal_arrays(&self, a: &ArrayD<f64>, b: &ArrayD<f64>) -> bool {
        if a.shape() != b.shape() {
            self.report(format_args!(
                "arrays have different shapes: {} vs {}",
                shape_str(a.shape()),
                shape_str(b.shape())
            ));
            return false;
        }
        let equal = a.iter().zip(b.iter()).all(|(x, y)| self.equal_f64(*x, *y));
        if !equal {
            self.report(format_args!("arrays have different elements:\n{a}\n{b}"));
        }
        equal
    }

    pub(crate) fn report(&self, message: fmt::Arguments<'_>) {
        if self.config.show_difference {
            info!("{message}");
        }
    }
}

impl Default for EqualityContext {
    fn default() -> Self {
        Self::new(EqualityConfig::default())
    }
}

/// Whether two values are equal.
#[must_use]
pub fn objects_are_equal(
    actual: &dyn Comparable,
    expected: &dyn Comparable,
    equal_nan: bool,
) -> bool {
    EqualityContext::with_equal_nan(equal_nan).equal(actual, expected)
}

/// Whether two values are equal within `|a - b| <= atol + rtol * |b|`.
#[must_use]
pub fn objects_are_allclose(
    actual: &dyn Comparable,
    expected: &dyn Comparable,
    rtol: f64,
    atol: f64,
    equal_nan: bool,
) -> bool {
    EqualityContext::new(EqualityConfig {
        equal_nan,
        show_difference: false,
        tolerance: Some((rtol, atol)),
    })
    .equal(actual, expected)
}

fn downcast<T: 'static>(other: &dyn Comparable) -> Option<&T> {
    other.as_any().downcast_ref::<T>()
}

impl Comparable for f64 {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Scalar
    }

    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool {
        downcast::<f64>(other).is_some_and(|o| ctx.equal_f64(*self, *o))
    }
}

impl Comparable for usize {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Count
    }

    fn equal_to(&self, other: &dyn Comparable, _ctx: &EqualityContext) -> bool {
        downcast::<usize>(other).is_some_and(|o| self == o)
    }
}

impl Comparable for String {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn equal_to(&self, other: &dyn Comparable, _ctx: &EqualityContext) -> bool {
        downcast::<String>(other).is_some_and(|o| self == o)
    }
}

impl Comparable for ArrayD<f64> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Array
    }

    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool {
        downcast::<ArrayD<f64>>(other).is_some_and(|o| ctx.equal_arrays(self, o))
    }
}

impl Comparable for MetricValue {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::MetricValue
    }

    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool {
        let Some(other) = downcast::<MetricValue>(other) else {
            return false;
        };
        match (self, other) {
            (Self::Count(a), Self::Count(b)) => ctx.equal(a, b),
            (Self::Scalar(a), Self::Scalar(b)) => ctx.equal(a, b),
            (Self::Array(a), Self::Array(b)) => ctx.equal(a, b),
            _ => {
                ctx.report(format_args!("metric values differ in kind: {self:?} vs {other:?}"));
                false
            }
        }
    }
}

impl Comparable for Metrics {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Metrics
    }

    fn equal_to(&self, other: &dyn Comparable, ctx: &EqualityContext) -> bool {
        let Some(other) = downcast::<Metrics>(other) else {
            return false;
        };
        if self.len() != other.len() || self.keys().ne(other.keys()) {
            ctx.report(format_args!(
                "metrics have different keys: {:?} vs {:?}",
                self.keys().collect::<Vec<_>>(),
                other.keys().collect::<Vec<_>>()
            ));
            return false;
        }
        self.iter().zip(other.iter()).all(|((key, a), (_, b))| {
            let equal = ctx.equal(a, b);
            if !equal {
                ctx.report(format_args!("metrics differ at key '{key}'"));
            }
            equal
        })
    }
}
