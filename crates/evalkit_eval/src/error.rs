//! Error types for evaluation and analysis.

use evalkit_core::CoreError;
use thiserror::Error;

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while building or running analyzers.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Policy, key, shape, NaN or dependency error from the core layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No analyzer is registered under the tag.
    #[error("Analyzer '{0}' not found in registry")]
    UnknownAnalyzer(String),

    /// An analyzer tag was registered twice, or is empty.
    #[error("Invalid analyzer registration: {0}")]
    DuplicateRegistration(String),

    /// Malformed JSON configuration or data.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl EvalError {
    /// Whether this is a misconfiguration rather than a data problem.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::Core(e) => e.is_config_error(),
            Self::UnknownAnalyzer(_) | Self::DuplicateRegistration(_) | Self::Config(_) => true,
        }
    }

    /// The core error, if this wraps one.
    #[must_use]
    pub const fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }
}
