//! Arguments shared by every metric function.

use evalkit_core::{Metrics, NanPolicy};

/// Key decoration and NaN policy of one metric call.
///
/// # Example
///
/// ```rust
/// use evalkit_core::NanPolicy;
/// use evalkit_metrics::MetricArgs;
///
/// let args = MetricArgs::new()
///     .with_prefix("val_")
///     .with_nan_policy(NanPolicy::Omit);
/// assert_eq!(args.prefix, "val_");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricArgs {
    /// Prepended to every output key.
    pub prefix: String,
    /// Appended to every output key.
    pub suffix: String,
    /// NaN handling.
    pub nan_policy: NanPolicy,
}

impl MetricArgs {
    /// No decoration, `propagate` NaN policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the key suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the NaN policy.
    #[must_use]
    pub fn with_nan_policy(mut self, nan_policy: NanPolicy) -> Self {
        self.nan_policy = nan_policy;
        self
    }

    pub(crate) fn decorate(&self, metrics: Metrics) -> Metrics {
        metrics.decorate(&self.prefix, &self.suffix)
    }
}

/// Format a numeric option for use inside a metric name, e.g. `1.0` as `1`.
pub(crate) fn key_number(value: f64) -> String {
    format!("{value}")
}
