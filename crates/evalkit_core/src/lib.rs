//! # evalkit_core
//!
//! Core types shared by the evalkit crates.
//!
//! This crate provides:
//! - [`CoreError`] and the crate-wide [`Result`] alias
//! - Policy enumerations ([`MissingPolicy`], [`ExistPolicy`], [`NanPolicy`]) and their validator
//! - Key-presence checking over any [`KeySource`]
//! - [`MetricValue`] and [`Metrics`], the values produced by metric functions
//! - Array checking and filtering helpers, and seeded random replacement
//! - [`EqualityContext`], a comparator registry for deep NaN-aware equality
//!
//! ## Example
//!
//! ```rust
//! use evalkit_core::{check_missing_keys, MissingPolicy};
//!
//! let columns = vec!["target", "pred"];
//! assert!(check_missing_keys(&columns, &["target"], MissingPolicy::Raise).is_ok());
//! assert!(check_missing_keys(&columns, &["score"], MissingPolicy::Raise).is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
mod equality;
mod error;
mod keys;
mod policy;
mod random;
pub mod testing;
mod value;

pub use equality::{
    objects_are_allclose, objects_are_equal, Category, ChainComparator, Comparable,
    EqualityComparator, EqualityConfig, EqualityContext, Handler,
};
pub use error::{CoreError, Result};
pub use keys::{check_missing_key, check_missing_keys, find_missing_keys, KeySource};
pub use policy::{
    check_exist_policy, check_missing_policy, check_nan_policy, check_policy, ExistPolicy,
    MissingPolicy, NanPolicy, PolicyKind,
};
pub use random::{rand_replace, Seed};
pub use value::{MetricValue, Metrics};
