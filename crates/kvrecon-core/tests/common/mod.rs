use kvrecon_core::{KvPair, KvStore, MemoryKv, StoreError};
use std::sync::Mutex;

/// A store call as observed by [`RecordingKv`]
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Put(String, String),
    Delete(String),
}

/// Memory store that records every call and can be told to fail
///
/// `fail_on_mutation(n)` makes the n-th put/delete (zero-based) fail without
/// touching the underlying store. `fail_list` makes every list fail.
#[derive(Debug, Default)]
pub struct RecordingKv {
    inner: MemoryKv,
    calls: Mutex<Vec<Call>>,
    fail_on_mutation: Option<usize>,
    fail_list: bool,
}

#[allow(dead_code)]
impl RecordingKv {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            inner: MemoryKv::with_pairs(pairs.iter().map(|(k, v)| KvPair::new(*k, *v))),
            ..Self::default()
        }
    }

    pub fn fail_on_mutation(mut self, index: usize) -> Self {
        self.fail_on_mutation = Some(index);
        self
    }

    pub fn fail_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::List(_)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.snapshot().get(key).cloned()
    }

    pub fn inner(&self) -> &MemoryKv {
        &self.inner
    }

    fn record_mutation(&self, call: Call) -> Result<(), StoreError> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.iter().filter(|c| !matches!(c, Call::List(_))).count();
        calls.push(call);
        if self.fail_on_mutation == Some(index) {
            return Err(StoreError::new(format!("injected failure at mutation {}", index)));
        }
        Ok(())
    }
}

impl KvStore for RecordingKv {
    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        self.calls.lock().unwrap().push(Call::List(prefix.to_string()));
        if self.fail_list {
            return Err(StoreError::new("connection refused"));
        }
        self.inner.list(prefix)
    }

    fn put(&self, pair: &KvPair) -> Result<(), StoreError> {
        self.record_mutation(Call::Put(pair.key.clone(), pair.value.clone()))?;
        self.inner.put(pair)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.record_mutation(Call::Delete(key.to_string()))?;
        self.inner.delete(key)
    }
}

/// Store that returns a fixed listing, duplicates and ordering preserved
#[allow(dead_code)]
#[derive(Debug)]
pub struct ListingKv {
    pairs: Vec<KvPair>,
}

#[allow(dead_code)]
impl ListingKv {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            pairs: pairs.iter().map(|(k, v)| KvPair::new(*k, *v)).collect(),
        }
    }
}

impl KvStore for ListingKv {
    fn list(&self, _prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        Ok(self.pairs.clone())
    }

    fn put(&self, _pair: &KvPair) -> Result<(), StoreError> {
        Err(StoreError::new("read-only listing"))
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::new("read-only listing"))
    }
}
