//! Keyed data sources consumed by analyzers.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use ndarray::{Array1, Array2, ArrayD};
use serde::Deserialize;
use serde_json::{Map, Value};

use evalkit_core::{CoreError, KeySource, Result};

/// A mapping from column name to numeric array.
pub trait DataSource: KeySource + Send + Sync {
    /// The array stored under `key`, failing with `KeyNotFound` when absent.
    fn column(&self, key: &str) -> Result<ArrayD<f64>>;

    /// Sorted column names.
    fn column_names(&self) -> Vec<String>;
}

fn key_not_found(key: &str) -> CoreError {
    CoreError::KeyNotFound(format!("key '{key}' is missing in the data"))
}

impl<S: BuildHasher + Send + Sync> DataSource for HashMap<String, ArrayD<f64>, S> {
    fn column(&self, key: &str) -> Result<ArrayD<f64>> {
        self.get(key).cloned().ok_or_else(|| key_not_found(key))
    }

    fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keys().cloned().collect();
        names.sort();
        names
    }
}

impl DataSource for BTreeMap<String, ArrayD<f64>> {
    fn column(&self, key: &str) -> Result<ArrayD<f64>> {
        self.get(key).cloned().ok_or_else(|| key_not_found(key))
    }

    fn column_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Columns parsed from a JSON object of name to (nested) numeric array.
///
/// A flat array becomes a 1-D column and an array of equally long arrays a
/// 2-D column. `null` entries become NaN.
///
/// ```rust
/// use evalkit_core::KeySource;
/// use evalkit_eval::{Columns, DataSource};
///
/// let columns = Columns::from_json_str(r#"{"target": [1, 0, null], "pred": [[1, 0], [0, 1], [1, 1]]}"#)
///     .unwrap();
/// assert!(columns.has_key("target"));
/// assert!(columns.column("target").unwrap()[[2]].is_nan());
/// assert_eq!(columns.column("pred").unwrap().shape(), &[3, 2]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Columns(BTreeMap<String, ArrayD<f64>>);

impl Columns {
    /// No columns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, key: impl Into<String>, column: ArrayD<f64>) {
        self.0.insert(key.into(), column);
    }

    /// Borrow a column.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArrayD<f64>> {
        self.0.get(key)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there is no column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn number(key: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Null => Ok(f64::NAN),
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid(key, "a non-finite number")),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        _ => Err(invalid(key, "a value that is not a number")),
    }
}

fn invalid(key: &str, what: &str) -> CoreError {
    CoreError::InvalidValue(format!("column '{key}' contains {what}"))
}

fn coerce(key: &str, value: &Value) -> Result<ArrayD<f64>> {
    let Value::Array(items) = value else {
        return Err(invalid(key, "a value that is not an array"));
    };
    if !items.iter().any(Value::is_array) {
        let values = items
            .iter()
            .map(|v| number(key, v))
            .collect::<Result<Vec<f64>>>()?;
        return Ok(Array1::from(values).into_dyn());
    }
    let mut width = None;
    let mut flat = Vec::new();
    for row in items {
        let Value::Array(row) = row else {
            return Err(invalid(key, "a mix of scalars and arrays"));
        };
        if *width.get_or_insert(row.len()) != row.len() {
            return Err(invalid(key, "rows of different lengths"));
        }
        for v in row {
            flat.push(number(key, v)?);
        }
    }
    Array2::from_shape_vec((items.len(), width.unwrap_or(0)), flat)
        .map(|a| a.into_dyn())
        .map_err(|e| invalid(key, &e.to_string()))
}

impl TryFrom<Map<String, Value>> for Columns {
    type Error = CoreError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        map.iter()
            .map(|(key, value)| Ok((key.clone(), coerce(key, value)?)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Self)
    }
}

impl From<BTreeMap<String, ArrayD<f64>>> for Columns {
    fn from(columns: BTreeMap<String, ArrayD<f64>>) -> Self {
        Self(columns)
    }
}

impl<K: Into<String>> FromIterator<(K, ArrayD<f64>)> for Columns {
    fn from_iter<I: IntoIterator<Item = (K, ArrayD<f64>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl KeySource for Columns {
    fn has_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl DataSource for Columns {
    fn column(&self, key: &str) -> Result<ArrayD<f64>> {
        self.0.column(key)
    }

    fn column_names(&self) -> Vec<String> {
        self.0.column_names()
    }
}
