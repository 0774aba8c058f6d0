//! Shared scenario storage.
//!
//! Steps of one scenario hand resources to each other through a
//! [`SharedStorage`]: a setup step stores the theme it created under
//! `"theme"`, a later step reads it back. Values are typed; reading a key as
//! the wrong type is an error, not a panic.

use crate::result::{ProbeError, ProbeResult};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

/// Typed key/value store shared by the steps of a scenario.
///
/// Cloning yields a handle to the same storage.
#[derive(Clone, Default)]
pub struct SharedStorage {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for SharedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("SharedStorage");
        match self.keys() {
            Ok(keys) => out.field("keys", &keys),
            Err(_) => out.field("keys", &"<poisoned>"),
        };
        out.finish()
    }
}

impl SharedStorage {
    /// Create empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| ProbeError::fixture("shared storage lock poisoned"))
    }

    /// Store `value` under `key`, replacing what was there
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) -> ProbeResult<()> {
        let key = key.into();
        let mut inner = self.lock()?;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        debug!(key = %key, value_type = type_name::<T>(), "storing scenario value");
        let _ = inner.entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                type_name: type_name::<T>(),
                seq,
            },
        );
        Ok(())
    }

    /// Read the value under `key`
    ///
    /// # Errors
    ///
    /// [`ProbeError::Fixture`] when nothing is stored under `key` or the
    /// stored value is not a `T`.
    pub fn get<T: Any + Clone + Send + Sync>(&self, key: &str) -> ProbeResult<T> {
        let inner = self.lock()?;
        let entry = inner
            .entries
            .get(key)
            .ok_or_else(|| ProbeError::fixture(format!("nothing stored under {key:?}")))?;
        entry.value.downcast_ref::<T>().cloned().ok_or_else(|| {
            ProbeError::fixture(format!(
                "value under {key:?} is a {}, not a {}",
                entry.type_name,
                type_name::<T>()
            ))
        })
    }

    /// The most recently stored value of type `T`
    ///
    /// # Errors
    ///
    /// [`ProbeError::Fixture`] when no `T` has been stored.
    pub fn latest_of<T: Any + Clone + Send + Sync>(&self) -> ProbeResult<T> {
        let inner = self.lock()?;
        inner
            .entries
            .values()
            .filter(|e| e.value.is::<T>())
            .max_by_key(|e| e.seq)
            .and_then(|e| e.value.downcast_ref::<T>().cloned())
            .ok_or_else(|| ProbeError::fixture(format!("no {} stored", type_name::<T>())))
    }

    /// Whether anything is stored under `key`
    pub fn has(&self, key: &str) -> ProbeResult<bool> {
        Ok(self.lock()?.entries.contains_key(key))
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> ProbeResult<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Forget everything; called between scenarios
    pub fn clear(&self) -> ProbeResult<()> {
        self.lock()?.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Theme(&'static str);

    #[derive(Debug, Clone, PartialEq)]
    struct Channel(&'static str);

    #[test]
    fn test_set_and_get() {
        let storage = SharedStorage::new();
        storage.set("theme", Theme("maverick")).unwrap();
        assert_eq!(storage.get::<Theme>("theme").unwrap(), Theme("maverick"));
        assert!(storage.has("theme").unwrap());
        assert!(!storage.has("channel").unwrap());
    }

    #[test]
    fn test_set_replaces() {
        let storage = SharedStorage::new();
        storage.set("theme", Theme("a")).unwrap();
        storage.set("theme", Theme("b")).unwrap();
        assert_eq!(storage.get::<Theme>("theme").unwrap(), Theme("b"));
        assert_eq!(storage.keys().unwrap(), vec!["theme"]);
    }

    #[test]
    fn test_missing_key() {
        let err = SharedStorage::new().get::<Theme>("theme").unwrap_err();
        assert!(matches!(err, ProbeError::Fixture { .. }));
        assert!(err.to_string().contains("\"theme\""));
    }

    #[test]
    fn test_wrong_type() {
        let storage = SharedStorage::new();
        storage.set("theme", Channel("web")).unwrap();
        let err = storage.get::<Theme>("theme").unwrap_err();
        assert!(err.to_string().contains("Channel"));
    }

    #[test]
    fn test_latest_of_type() {
        let storage = SharedStorage::new();
        storage.set("first", Theme("a")).unwrap();
        storage.set("channel", Channel("web")).unwrap();
        storage.set("second", Theme("b")).unwrap();
        assert_eq!(storage.latest_of::<Theme>().unwrap(), Theme("b"));
        assert_eq!(storage.latest_of::<Channel>().unwrap(), Channel("web"));
        assert!(storage.latest_of::<String>().is_err());
    }

    #[test]
    fn test_clones_share_and_clear() {
        let storage = SharedStorage::new();
        let other = storage.clone();
        other.set("channel", Channel("web")).unwrap();
        assert!(storage.has("channel").unwrap());
        storage.clear().unwrap();
        assert!(!other.has("channel").unwrap());
        assert_eq!(format!("{storage:?}"), "SharedStorage { keys: [] }");
    }

    #[test]
    fn test_poisoned_lock_is_reported_everywhere() {
        let storage = SharedStorage::new();
        storage.set("theme", Theme("a")).unwrap();
        let poisoner = storage.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("step panicked while holding the storage");
        })
        .join();

        assert!(matches!(storage.has("theme").unwrap_err(), ProbeError::Fixture { .. }));
        assert!(matches!(storage.keys().unwrap_err(), ProbeError::Fixture { .. }));
        assert!(matches!(storage.clear().unwrap_err(), ProbeError::Fixture { .. }));
        assert!(storage.get::<Theme>("theme").is_err());
        assert_eq!(format!("{storage:?}"), r#"SharedStorage { keys: "<poisoned>" }"#);
    }
}
