//! # evalkit_eval
//!
//! Lazy evaluation and analysis on top of [`evalkit_metrics`].
//!
//! This crate provides:
//! - [`EvaluationState`]: an immutable, shape-checked pair of arrays plus a NaN policy
//! - Evaluators ([`MetricsEvaluator`], [`StateEvaluator`]) computing metrics on demand
//! - [`Output`]: an evaluator paired with a content generator, with `compute()`
//! - Analyzers turning keyed data into outputs, honouring a missing-key policy
//! - [`AnalyzerRegistry`]: declarative construction from [`AnalyzerConfig`] with
//!   capability injection
//!
//! ## Example
//!
//! ```rust
//! use evalkit_core::{objects_are_equal, NanPolicy};
//! use evalkit_eval::{EvaluationState, Evaluate, MetricKind, Output, StateEvaluator, TextContent};
//! use ndarray::array;
//!
//! let state = EvaluationState::new(
//!     array![1.0, 0.0, 0.0, 1.0].into_dyn(),
//!     array![1.0, 0.0, 1.0, 0.0].into_dyn(),
//!     "target",
//!     "pred",
//!     NanPolicy::Propagate,
//! )
//! .unwrap();
//! let evaluator = StateEvaluator::new(MetricKind::Precision, state);
//! let output = Output::new(evaluator.clone(), TextContent::new("precision"));
//!
//! let computed = output.compute().unwrap().get_evaluator(true).unwrap();
//! assert!(objects_are_equal(computed.as_comparable(), &evaluator.compute().unwrap(), false));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod analyzer;
mod config;
mod content;
mod data;
mod error;
mod evaluator;
mod metric;
mod output;
mod registry;
mod state;

pub use analyzer::{analyze_many, skip_missing_keys, Analyze, ContentAnalyzer, MetricAnalyzer};
pub use config::{is_analyzer_config, AnalyzerConfig};
pub use content::{ContentGenerator, TextContent};
pub use data::{Columns, DataSource};
pub use error::{EvalError, Result};
pub use evaluator::{Evaluate, MetricsEvaluator, StateEvaluator};
pub use metric::{Capability, MetricKind, MetricOptions};
pub use output::Output;
pub use registry::{AnalyzerBuilder, AnalyzerRegistry, CONTENT_TAG};
pub use state::{EvaluationState, StateBuilder};
