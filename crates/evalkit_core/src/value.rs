//! Metric values and metric mappings.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, ArrayD, ArrayViewD, Axis};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A single metric value.
///
/// Counts and scalars are distinct: `Count(3)` never equals `Scalar(3.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A number of samples or events.
    Count(usize),
    /// A real-valued statistic, possibly NaN.
    Scalar(f64),
    /// A per-class or per-label vector, or a matrix such as a confusion matrix.
    Array(ArrayD<f64>),
}

impl MetricValue {
    /// A NaN scalar.
    #[must_use]
    pub const fn nan() -> Self {
        Self::Scalar(f64::NAN)
    }

    /// An empty one-dimensional array.
    #[must_use]
    pub fn empty_array() -> Self {
        Self::Array(Array1::<f64>::zeros(0).into_dyn())
    }

    /// Numeric value of a count or scalar.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Count(c) => Some(*c as f64),
            Self::Scalar(v) => Some(*v),
            Self::Array(_) => None,
        }
    }

    /// Count value, if this is a count.
    #[must_use]
    pub const fn as_count(&self) -> Option<usize> {
        match self {
            Self::Count(c) => Some(*c),
            _ => None,
        }
    }

    /// Array value, if this is an array.
    #[must_use]
    pub const fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Whether the value is a NaN scalar.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Scalar(v) if v.is_nan())
    }
}

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        Self::Count(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<ArrayD<f64>> for MetricValue {
    fn from(value: ArrayD<f64>) -> Self {
        Self::Array(value)
    }
}

impl From<Array1<f64>> for MetricValue {
    fn from(value: Array1<f64>) -> Self {
        Self::Array(value.into_dyn())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(c) => write!(f, "{c}"),
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Array(a) => write!(f, "{a}"),
        }
    }
}

/// Serializes an array as nested sequences, one level per axis.
struct NestedArray<'a>(ArrayViewD<'a, f64>);

impl Serialize for NestedArray<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.ndim() == 0 {
            let value = self.0.iter().next().copied().unwrap_or(f64::NAN);
            return serializer.serialize_f64(value);
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len_of(Axis(0))))?;
        for sub in self.0.axis_iter(Axis(0)) {
            seq.serialize_element(&NestedArray(sub))?;
        }
        seq.end()
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(c) => serializer.serialize_u64(*c as u64),
            Self::Scalar(v) => serializer.serialize_f64(*v),
            Self::Array(a) => NestedArray(a.view()).serialize(serializer),
        }
    }
}

/// A flat mapping from metric name to value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics(BTreeMap<String, MetricValue>);

impl Metrics {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a metric, returning the previous value for that name.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetricValue>,
    ) -> Option<MetricValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a metric.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.0.get(key)
    }

    /// Numeric value of a count or scalar metric.
    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(MetricValue::as_f64)
    }

    /// Value of a count metric.
    #[must_use]
    pub fn count(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(MetricValue::as_count)
    }

    /// Value of an array metric.
    #[must_use]
    pub fn array(&self, key: &str) -> Option<&ArrayD<f64>> {
        self.get(key).and_then(MetricValue::as_array)
    }

    /// Whether a metric exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no metrics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetricValue)> {
        self.0.iter()
    }

    /// Metric names in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Return a copy with every key rewritten to `{prefix}{key}{suffix}`.
    #[must_use]
    pub fn decorate(&self, prefix: &str, suffix: &str) -> Self {
        if prefix.is_empty() && suffix.is_empty() {
            return self.clone();
        }
        self.0
            .iter()
            .map(|(k, v)| (format!("{prefix}{k}{suffix}"), v.clone()))
            .collect()
    }

    /// Add every metric of `other`, overwriting duplicates.
    pub fn merge(&mut self, other: Metrics) {
        self.0.extend(other.0);
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, MetricValue> {
        &self.0
    }

    /// Consume into the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, MetricValue> {
        self.0
    }
}

impl<K: Into<String>, V: Into<MetricValue>> FromIterator<(K, V)> for Metrics {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Metrics {
    type Item = (String, MetricValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<BTreeMap<String, MetricValue>> for Metrics {
    fn from(value: BTreeMap<String, MetricValue>) -> Self {
        Self(value)
    }
}

impl Serialize for Metrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{k}': {v}")?;
        }
        write!(f, "}}")
    }
}
