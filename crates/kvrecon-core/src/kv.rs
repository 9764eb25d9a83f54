//! Store accessor contract
//!
//! The reconciler needs exactly three capabilities from the backing store:
//! list everything under a prefix, put one pair, delete one key. Network
//! clients implement [`KvStore`] outside this crate; [`MemoryKv`] is the
//! in-process implementation used by tests and embedded callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// One entry as stored or declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvPair {
    pub key: String,
    pub value: String,
}

impl KvPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Failure reported by a store accessor
///
/// Displays the store's own message unchanged; the reconciler never
/// interprets or rewrites it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Capture any client error by its display text
    pub fn from_source(err: &dyn std::error::Error) -> Self {
        Self::new(err.to_string())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Minimal capability set required from a key-value store
///
/// Methods take `&self`: the reconciler treats the handle as shared state and
/// issues calls strictly one after another.
pub trait KvStore {
    /// Return every pair whose key starts with `prefix`, in store order
    ///
    /// # Errors
    ///
    /// Returns the store's failure unchanged.
    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError>;

    /// Create or overwrite a single key
    ///
    /// # Errors
    ///
    /// Returns the store's failure unchanged.
    fn put(&self, pair: &KvPair) -> Result<(), StoreError>;

    /// Delete a single key
    ///
    /// # Errors
    ///
    /// Returns the store's failure unchanged.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        (**self).list(prefix)
    }

    fn put(&self, pair: &KvPair) -> Result<(), StoreError> {
        (**self).put(pair)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        (**self).list(prefix)
    }

    fn put(&self, pair: &KvPair) -> Result<(), StoreError> {
        (**self).put(pair)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// In-memory key-value store
///
/// Keys are kept sorted, so `list` returns pairs in lexical key order like
/// most hierarchical KV stores do.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKv {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `pairs`; later duplicates overwrite earlier ones
    pub fn with_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = KvPair>,
    {
        let entries = pairs.into_iter().map(|p| (p.key, p.value)).collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::new("memory store lock poisoned"))
    }
}

impl KvStore for MemoryKv {
    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        let entries = self.locked()?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| KvPair::new(k.clone(), v.clone()))
            .collect())
    }

    fn put(&self, pair: &KvPair) -> Result<(), StoreError> {
        self.locked()?.insert(pair.key.clone(), pair.value.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.locked()?.remove(key);
        Ok(())
    }
}
