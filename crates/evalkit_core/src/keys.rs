//! Key-presence checking for keyed data sources.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::BuildHasher;

use tracing::warn;

use crate::error::{CoreError, Result};
use crate::policy::MissingPolicy;

/// Anything that can answer whether it holds a key.
pub trait KeySource {
    /// Whether `key` is present.
    fn has_key(&self, key: &str) -> bool;
}

impl<V, S: BuildHasher> KeySource for HashMap<String, V, S> {
    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl<V> KeySource for BTreeMap<String, V> {
    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl<S: BuildHasher> KeySource for std::collections::HashSet<String, S> {
    fn has_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}

impl<T: AsRef<str>> KeySource for [T] {
    fn has_key(&self, key: &str) -> bool {
        self.iter().any(|k| k.as_ref() == key)
    }
}

impl<T: AsRef<str>> KeySource for Vec<T> {
    fn has_key(&self, key: &str) -> bool {
        self.as_slice().has_key(key)
    }
}

/// Sorted, deduplicated keys of `keys` that `source` does not hold.
///
/// # Example
///
/// ```rust
/// use evalkit_core::find_missing_keys;
///
/// let known = vec!["key1", "key2"];
/// assert_eq!(find_missing_keys(&known, &["key3", "key1", "key0"]), vec!["key0", "key3"]);
/// ```
pub fn find_missing_keys<S, K>(source: &S, keys: &[K]) -> Vec<String>
where
    S: KeySource + ?Sized,
    K: AsRef<str>,
{
    keys.iter()
        .map(AsRef::as_ref)
        .filter(|k| !source.has_key(k))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Apply `policy` to a single required key.
///
/// # Errors
///
/// Returns [`CoreError::KeyNotFound`] if the key is absent and the policy
/// is [`MissingPolicy::Raise`].
pub fn check_missing_key<S>(source: &S, key: &str, policy: MissingPolicy) -> Result<()>
where
    S: KeySource + ?Sized,
{
    if source.has_key(key) {
        return Ok(());
    }
    match policy {
        MissingPolicy::Ignore => Ok(()),
        MissingPolicy::Warn => {
            warn!("key '{key}' is missing in the data and will be ignored");
            Ok(())
        }
        MissingPolicy::Raise => Err(CoreError::KeyNotFound(format!(
            "key '{key}' is missing in the data"
        ))),
    }
}

/// Apply `policy` to a set of required keys, reporting every missing key at once.
///
/// # Errors
///
/// Returns [`CoreError::KeyNotFound`] listing all absent keys if at least one
/// is absent and the policy is [`MissingPolicy::Raise`].
pub fn check_missing_keys<S, K>(source: &S, keys: &[K], policy: MissingPolicy) -> Result<()>
where
    S: KeySource + ?Sized,
    K: AsRef<str>,
{
    let missing = find_missing_keys(source, keys);
    if missing.is_empty() {
        return Ok(());
    }
    let noun = if missing.len() == 1 { "key is" } else { "keys are" };
    let listed = missing
        .iter()
        .map(|k| format!("'{k}'"))
        .collect::<Vec<_>>()
        .join(", ");
    match policy {
        MissingPolicy::Ignore => Ok(()),
        MissingPolicy::Warn => {
            warn!(
                "{} {noun} missing in the data and will be ignored: [{listed}]",
                missing.len()
            );
            Ok(())
        }
        MissingPolicy::Raise => Err(CoreError::KeyNotFound(format!(
            "{} {noun} missing in the data: [{listed}]",
            missing.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;
    use tracing::Level;

    fn data() -> HashMap<String, Vec<f64>> {
        ["key1", "key2", "key3", "key4"]
            .into_iter()
            .map(|k| (k.to_string(), vec![1.0, 2.0]))
            .collect()
    }

    #[test]
    fn test_find_missing_keys() {
        assert!(find_missing_keys(&data(), &["key1", "key2"]).is_empty());
        assert_eq!(
            find_missing_keys(&data(), &["key6", "key1", "key5", "key6"]),
            vec!["key5", "key6"]
        );
    }

    #[test]
    fn test_find_missing_keys_from_key_list() {
        let keys = vec!["a".to_string(), "b".to_string()];
        assert_eq!(find_missing_keys(&keys, &["b", "c"]), vec!["c"]);
        assert_eq!(find_missing_keys(&keys[..], &["a"]), Vec::<String>::new());
    }

    #[test]
    fn test_check_missing_key_present() {
        for policy in [MissingPolicy::Ignore, MissingPolicy::Warn, MissingPolicy::Raise] {
            let ((), logs) = capture_logs(|| check_missing_key(&data(), "key1", policy).unwrap());
            assert!(logs.at(Level::WARN).is_empty());
        }
    }

    #[test]
    fn test_check_missing_key_ignore() {
        let ((), logs) =
            capture_logs(|| check_missing_key(&data(), "key", MissingPolicy::Ignore).unwrap());
        assert!(logs.at(Level::WARN).is_empty());
    }

    #[test]
    fn test_check_missing_key_raise() {
        let err = check_missing_key(&data(), "key", MissingPolicy::Raise).unwrap_err();
        assert_eq!(err, CoreError::KeyNotFound("key 'key' is missing in the data".into()));
    }

    #[test]
    fn test_check_missing_key_warn() {
        let ((), logs) =
            capture_logs(|| check_missing_key(&data(), "key", MissingPolicy::Warn).unwrap());
        assert_eq!(
            logs.at(Level::WARN),
            vec!["key 'key' is missing in the data and will be ignored".to_string()]
        );
    }

    #[test]
    fn test_check_missing_keys_raise_singular_and_plural() {
        let err = check_missing_keys(&data(), &["key1", "key5"], MissingPolicy::Raise).unwrap_err();
        assert_eq!(err.to_string(), "1 key is missing in the data: ['key5']");
        let err = check_missing_keys(&data(), &["key1", "key6", "key5"], MissingPolicy::Raise)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "2 keys are missing in the data: ['key5', 'key6']"
        );
    }

    #[test]
    fn test_check_missing_keys_warn_single_message() {
        let ((), logs) = capture_logs(|| {
            check_missing_keys(&data(), &["key1", "key5", "key6"], MissingPolicy::Warn).unwrap();
        });
        let warnings = logs.at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("2 keys are missing in the data and will be ignored:"));
    }

    #[test]
    fn test_check_missing_keys_none_missing() {
        for policy in [MissingPolicy::Ignore, MissingPolicy::Warn, MissingPolicy::Raise] {
            assert!(check_missing_keys(&data(), &["key1", "key2"], policy).is_ok());
        }
    }
}
