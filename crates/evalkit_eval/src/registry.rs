//! Analyzer registry for building analyzers from configuration.
//!
//! Tags map to builder functions and are validated when registered. Each tag
//! may depend on a [`Capability`], which the embedding application must
//! [`provide`](AnalyzerRegistry::provide) before analyzers using it can be
//! built.
//!
//! # Example
//!
//! ```rust
//! use evalkit_eval::{Analyze, AnalyzerConfig, AnalyzerRegistry, Columns};
//!
//! let registry = AnalyzerRegistry::with_builtins();
//! let config = AnalyzerConfig::new("mean_squared_error").with_keys("target", "pred");
//! let analyzer = registry.build(&config).unwrap();
//!
//! let data = Columns::from_json_str(r#"{"target": [1, 2, 3], "pred": [1, 2, 5]}"#).unwrap();
//! let metrics = analyzer.analyze(&data, false).unwrap().evaluator().evaluate("", "").unwrap();
//! assert_eq!(metrics.scalar("mean_squared_error"), Some(4.0 / 3.0));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use evalkit_core::CoreError;
use tracing::{debug, info};

use crate::analyzer::{Analyze, ContentAnalyzer, MetricAnalyzer};
use crate::config::AnalyzerConfig;
use crate::error::{EvalError, Result};
use crate::metric::{Capability, MetricKind};

/// Tag of the built-in [`ContentAnalyzer`].
pub const CONTENT_TAG: &str = "content";

/// Type alias for analyzer builders.
pub type AnalyzerBuilder = Arc<dyn Fn(&AnalyzerConfig) -> Result<Box<dyn Analyze>> + Send + Sync>;

#[derive(Clone)]
struct Entry {
    capability: Option<Capability>,
    builder: AnalyzerBuilder,
}

/// Registry for building analyzers by tag.
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    entries: HashMap<String, Entry>,
    provided: HashSet<Capability>,
}

impl fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut provided: Vec<_> = self.provided.iter().collect();
        provided.sort();
        f.debug_struct("AnalyzerRegistry")
            .field("tags", &self.list())
            .field("provided", &provided)
            .finish()
    }
}

impl AnalyzerRegistry {
    /// Create an empty registry with no capability provided.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every metric family and the content analyzer
    /// registered, and every capability provided.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        for capability in Capability::ALL {
            registry.provide(capability);
        }
        registry
    }

    /// Register the built-in tags without providing any capability.
    pub fn register_builtins(&mut self) {
        for &kind in MetricKind::ALL {
            self.entries.insert(
                kind.tag().to_string(),
                Entry {
                    capability: Some(kind.capability()),
                    builder: Arc::new(move |config| metric_analyzer(kind, config)),
                },
            );
        }
        self.entries.insert(
            CONTENT_TAG.to_string(),
            Entry {
                capability: None,
                builder: Arc::new(|config| {
                    let text = config.text.clone().unwrap_or_default();
                    Ok(Box::new(ContentAnalyzer::new(text)) as Box<dyn Analyze>)
                }),
            },
        );
    }

    /// Register a builder under `tag`.
    ///
    /// # Arguments
    ///
    /// * `tag` - Non-empty tag, not yet registered
    /// * `capability` - Capability the built analyzers depend on, if any
    /// * `builder` - A function that creates the analyzer from config
    pub fn register<F>(
        &mut self,
        tag: &str,
        capability: Option<Capability>,
        builder: F,
    ) -> Result<()>
    where
        F: Fn(&AnalyzerConfig) -> Result<Box<dyn Analyze>> + Send + Sync + 'static,
    {
        if tag.trim().is_empty() {
            return Err(EvalError::DuplicateRegistration("empty analyzer tag".into()));
        }
        if self.entries.contains_key(tag) {
            return Err(EvalError::DuplicateRegistration(format!(
                "tag '{tag}' is already registered"
            )));
        }
        info!("Registering analyzer '{tag}'");
        self.entries.insert(
            tag.to_string(),
            Entry {
                capability,
                builder: Arc::new(builder),
            },
        );
        Ok(())
    }

    /// Make `capability` available to the analyzers that need it.
    pub fn provide(&mut self, capability: Capability) {
        debug!(%capability, "capability provided");
        self.provided.insert(capability);
    }

    /// Whether `capability` has been provided.
    #[must_use]
    pub fn is_provided(&self, capability: Capability) -> bool {
        self.provided.contains(&capability)
    }

    /// Build the analyzer described by `config`.
    pub fn build(&self, config: &AnalyzerConfig) -> Result<Box<dyn Analyze>> {
        let tag = config.analyzer.as_str();
        let entry = self
            .entries
            .get(tag)
            .ok_or_else(|| EvalError::UnknownAnalyzer(tag.to_string()))?;
        if let Some(capability) = entry.capability {
            if !self.is_provided(capability) {
                return Err(CoreError::MissingDependency(format!(
                    "analyzer '{tag}' requires the '{capability}' capability, which was not provided"
                ))
                .into());
            }
        }
        let analyzer = (entry.builder)(config)?;
        info!("Built {analyzer}");
        Ok(analyzer)
    }

    /// Build every configured analyzer, failing on the first error.
    pub fn build_all(&self, configs: &[AnalyzerConfig]) -> Result<Vec<Box<dyn Analyze>>> {
        configs.iter().map(|config| self.build(config)).collect()
    }

    /// List all registered tags, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Check if a tag is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Capability required by `tag`; `None` if the tag is unknown or needs none.
    #[must_use]
    pub fn capability_of(&self, tag: &str) -> Option<Capability> {
        self.entries.get(tag).and_then(|entry| entry.capability)
    }
}

fn metric_analyzer(kind: MetricKind, config: &AnalyzerConfig) -> Result<Box<dyn Analyze>> {
    let (y_true, y_pred) = config.keys()?;
    Ok(Box::new(
        MetricAnalyzer::new(kind, y_true, y_pred)
            .with_missing_policy(config.missing_policy)
            .with_nan_policy(config.nan_policy)
            .with_options(config.options.clone()),
    ))
}
