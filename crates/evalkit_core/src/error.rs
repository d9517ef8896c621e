//! Error types for evalkit_core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors shared by every evalkit crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A configuration value (policy, label type, option) is not recognized.
    #[error("{0}")]
    InvalidConfig(String),

    /// A required key is absent from the data under the `raise` policy.
    #[error("{0}")]
    KeyNotFound(String),

    /// Arrays that must share a shape do not.
    #[error("{0}")]
    ShapeMismatch(String),

    /// An array contains NaN under the `raise` NaN policy.
    #[error("'{name}' contains at least one NaN value")]
    NanFound {
        /// Name of the offending array.
        name: String,
    },

    /// An input value is outside the domain of a computation.
    #[error("{0}")]
    InvalidValue(String),

    /// A numerical capability required by an operation was not provided.
    #[error("Missing dependency: {0}")]
    MissingDependency(String),
}

impl CoreError {
    /// Whether this error belongs to the configuration family.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// Whether this error is caused by the data of a single evaluation.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch(_) | Self::NanFound { .. } | Self::InvalidValue(_)
        )
    }
}
