//! # evalkit
//!
//! Policy-driven metric evaluation in Rust.
//!
//! evalkit computes evaluation metrics over arrays with explicit, validated
//! policies for NaN values and missing data keys:
//!
//! - **Core**: policies, key-presence checks, metric values, NaN-aware equality
//! - **Metrics**: classification, ranking, regression, distribution and correlation metrics
//! - **Evaluation**: immutable states, lazy evaluators, outputs and their `compute()` protocol
//! - **Analysis**: analyzers over keyed data, built from JSON configuration through a registry
//!
//! ## Quick Start
//!
//! ```rust
//! use evalkit::prelude::*;
//!
//! let data = Columns::from_json_str(r#"{"target": [1, 0, 0, 1], "pred": [1, 0, 1, 0]}"#)?;
//! let registry = AnalyzerRegistry::with_builtins();
//! let configs = AnalyzerConfig::list_from_json_str(
//!     r#"[{"analyzer": "accuracy", "y_true": "target", "y_pred": "pred"},
//!         {"analyzer": "precision", "y_true": "target", "y_pred": "pred", "label_type": "binary"}]"#,
//! )?;
//! let analyzers = registry.build_all(&configs)?;
//! let outputs = analyze_many(&analyzers, &data, false)?;
//!
//! let precision = outputs[1].evaluator().evaluate("val_", "")?;
//! assert_eq!(precision.scalar("val_precision"), Some(0.5));
//! assert_eq!(precision.count("val_count"), Some(4));
//! # Ok::<(), evalkit::EvalError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all crates
pub use evalkit_core as core;
pub use evalkit_eval as eval;
pub use evalkit_metrics as metrics;

pub use evalkit_core::CoreError;
pub use evalkit_eval::{EvalError, Result};

/// Prelude module for convenient imports.
///
/// ```rust
/// use evalkit::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use evalkit_core::{
        check_missing_keys, objects_are_allclose, objects_are_equal, Comparable, CoreError,
        EqualityContext, ExistPolicy, MetricValue, Metrics, MissingPolicy, NanPolicy, Seed,
    };

    // Metrics
    pub use evalkit_metrics::{
        accuracy, confusion_matrix, mean_absolute_error, mean_squared_error, pearsonr, precision,
        r2_score, recall, roc_auc, wasserstein_distance, LabelType, MetricArgs,
    };

    // Evaluation
    pub use evalkit_eval::{
        analyze_many, Analyze, AnalyzerConfig, AnalyzerRegistry, Capability, Columns,
        ContentAnalyzer, ContentGenerator, DataSource, EvalError, Evaluate, EvaluationState,
        MetricAnalyzer, MetricKind, MetricOptions, MetricsEvaluator, Output, StateEvaluator,
        TextContent,
    };
}
