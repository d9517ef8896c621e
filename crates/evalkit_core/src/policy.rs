//! Policy enumerations and their validator.
//!
//! Three independent policies drive the evaluation pipeline:
//!
//! - [`MissingPolicy`]: what to do when a required data key is absent.
//! - [`ExistPolicy`]: what to do when a key that must not exist is present.
//! - [`NanPolicy`]: how metric functions treat NaN values.
//!
//! Every policy is parsed through [`check_policy`] so an invalid value is
//! rejected when it is configured, never later during a computation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// The kind of a policy, used to report which setting is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// `missing_policy`.
    Missing,
    /// `exist_policy`.
    Exist,
    /// `nan_policy`.
    Nan,
}

impl PolicyKind {
    /// Name of the setting, as written in configurations.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Missing => "missing_policy",
            Self::Exist => "exist_policy",
            Self::Nan => "nan_policy",
        }
    }

    /// Accepted values, sorted.
    #[must_use]
    pub const fn valid_values(&self) -> &'static [&'static str] {
        match self {
            Self::Missing | Self::Exist => &["ignore", "raise", "warn"],
            Self::Nan => &["omit", "propagate", "raise"],
        }
    }
}

/// Validate a policy value.
///
/// # Errors
///
/// Returns [`CoreError::InvalidConfig`] if `value` is not one of the values
/// accepted by `kind`.
///
/// # Example
///
/// ```rust
/// use evalkit_core::{check_policy, PolicyKind};
///
/// assert!(check_policy(PolicyKind::Missing, "warn").is_ok());
/// assert!(check_policy(PolicyKind::Missing, "omit").is_err());
/// ```
pub fn check_policy(kind: PolicyKind, value: &str) -> Result<()> {
    if kind.valid_values().contains(&value) {
        return Ok(());
    }
    let valid = kind
        .valid_values()
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(CoreError::InvalidConfig(format!(
        "Incorrect '{}': {value}. The valid values are: {valid}",
        kind.name()
    )))
}

/// Validate a `missing_policy` value.
pub fn check_missing_policy(value: &str) -> Result<()> {
    check_policy(PolicyKind::Missing, value)
}

/// Validate an `exist_policy` value.
pub fn check_exist_policy(value: &str) -> Result<()> {
    check_policy(PolicyKind::Exist, value)
}

/// Validate a `nan_policy` value.
pub fn check_nan_policy(value: &str) -> Result<()> {
    check_policy(PolicyKind::Nan, value)
}

/// Severity applied when a required key is absent from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MissingPolicy {
    /// Proceed silently.
    Ignore,
    /// Emit one warning, then proceed as if ignored.
    Warn,
    /// Fail with [`CoreError::KeyNotFound`].
    #[default]
    Raise,
}

impl MissingPolicy {
    /// Policy value as written in configurations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Warn => "warn",
            Self::Raise => "raise",
        }
    }
}

impl FromStr for MissingPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        check_policy(PolicyKind::Missing, s)?;
        Ok(match s {
            "ignore" => Self::Ignore,
            "warn" => Self::Warn,
            _ => Self::Raise,
        })
    }
}

/// Severity applied when a key that should be new already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExistPolicy {
    /// Proceed silently.
    Ignore,
    /// Emit one warning, then proceed.
    Warn,
    /// Fail.
    #[default]
    Raise,
}

impl ExistPolicy {
    /// Policy value as written in configurations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Warn => "warn",
            Self::Raise => "raise",
        }
    }
}

impl FromStr for ExistPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        check_policy(PolicyKind::Exist, s)?;
        Ok(match s {
            "ignore" => Self::Ignore,
            "warn" => Self::Warn,
            _ => Self::Raise,
        })
    }
}

/// How metric functions treat NaN values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NanPolicy {
    /// Drop every position that is NaN in at least one input.
    Omit,
    /// Keep NaN values; any NaN turns the statistics into NaN.
    #[default]
    Propagate,
    /// Fail with [`CoreError::NanFound`] on the first array with a NaN.
    Raise,
}

impl NanPolicy {
    /// Policy value as written in configurations.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Omit => "omit",
            Self::Propagate => "propagate",
            Self::Raise => "raise",
        }
    }
}

impl FromStr for NanPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        check_nan_policy(s)?;
        Ok(match s {
            "omit" => Self::Omit,
            "propagate" => Self::Propagate,
            _ => Self::Raise,
        })
    }
}

macro_rules! impl_policy_conversions {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $ty {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.as_str().to_string()
            }
        }
    )*};
}

impl_policy_conversions!(MissingPolicy, ExistPolicy, NanPolicy);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_missing_policy_valid() {
        for value in ["ignore", "warn", "raise"] {
            assert!(check_missing_policy(value).is_ok());
            assert!(check_exist_policy(value).is_ok());
        }
    }

    #[test]
    fn test_check_missing_policy_incorrect() {
        let err = check_missing_policy("incorrect").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Incorrect 'missing_policy': incorrect. The valid values are: 'ignore', 'raise', 'warn'"
        );
        assert!(err.is_config_error());
    }

    #[test]
    fn test_check_exist_policy_incorrect() {
        let err = check_exist_policy("omit").unwrap_err();
        assert!(err.to_string().starts_with("Incorrect 'exist_policy': omit."));
    }

    #[test]
    fn test_check_nan_policy() {
        for value in ["omit", "propagate", "raise"] {
            assert!(check_nan_policy(value).is_ok());
        }
        let err = check_nan_policy("warn").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Incorrect 'nan_policy': warn. The valid values are: 'omit', 'propagate', 'raise'"
        );
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("warn".parse::<MissingPolicy>().unwrap(), MissingPolicy::Warn);
        assert_eq!("ignore".parse::<ExistPolicy>().unwrap(), ExistPolicy::Ignore);
        assert_eq!("omit".parse::<NanPolicy>().unwrap(), NanPolicy::Omit);
        assert_eq!(NanPolicy::Propagate.to_string(), "propagate");
        assert_eq!(MissingPolicy::default(), MissingPolicy::Raise);
        assert_eq!(NanPolicy::default(), NanPolicy::Propagate);
    }

    #[test]
    fn test_parse_round_trips_every_variant() {
        for policy in [MissingPolicy::Ignore, MissingPolicy::Warn, MissingPolicy::Raise] {
            assert_eq!(policy.as_str().parse::<MissingPolicy>().unwrap(), policy);
        }
        for policy in [ExistPolicy::Ignore, ExistPolicy::Warn, ExistPolicy::Raise] {
            assert_eq!(policy.as_str().parse::<ExistPolicy>().unwrap(), policy);
        }
        let err = "propagate".parse::<ExistPolicy>().unwrap_err();
        assert!(err.to_string().starts_with("Incorrect 'exist_policy': propagate."));
    }

    #[test]
    fn test_parse_rejects_case_variants() {
        assert!("Warn".parse::<MissingPolicy>().is_err());
        assert!("".parse::<NanPolicy>().is_err());
    }
}
