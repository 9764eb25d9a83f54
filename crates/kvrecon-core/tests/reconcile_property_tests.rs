#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Property tests for the differ and the apply loop.

use kvrecon_core::apply::apply_changes;
use kvrecon_core::diff::{classify, compute_changes, ChangeFilter};
use kvrecon_core::{Change, FlatMap, KvPair, KvStore, MemoryKv, DEFAULT_IGNORE_VALUE};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "a/b", "a/c", "b", "c/d/e", "x", "y/0", "y/1"])
        .prop_map(str::to_string)
}

fn value() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", "1", "2", "on", "off", DEFAULT_IGNORE_VALUE])
        .prop_map(str::to_string)
}

fn flat_map() -> impl Strategy<Value = FlatMap> {
    prop::collection::btree_map(key(), value(), 0..8)
}

fn listing(map: &BTreeMap<String, String>) -> Vec<KvPair> {
    map.iter().map(|(k, v)| KvPair::new(k.clone(), v.clone())).collect()
}

proptest! {
    #[test]
    fn prop_exactly_one_change_per_differing_key(old in flat_map(), new in flat_map()) {
        let changes = classify(&listing(&old), &new);

        let keys: Vec<&str> = changes.keys().collect();
        let unique: HashSet<&str> = keys.iter().copied().collect();
        prop_assert_eq!(keys.len(), unique.len());

        let all_keys: HashSet<&String> = old.keys().chain(new.keys()).collect();
        for k in all_keys {
            let differs = old.get(k) != new.get(k);
            prop_assert_eq!(unique.contains(k.as_str()), differs, "key {}", k);
        }

        for change in &changes {
            let k = change.key();
            prop_assert_eq!(change.old_value(), old.get(k).map(String::as_str));
            prop_assert_eq!(change.new_value(), new.get(k).map(String::as_str));
        }
    }

    #[test]
    fn prop_applying_changes_converges(old in flat_map(), new in flat_map()) {
        let kv = MemoryKv::with_pairs(listing(&old));
        let changes = classify(&kv.list("").unwrap(), &new);

        apply_changes(&kv, &changes).unwrap();

        prop_assert_eq!(&kv.snapshot(), &new);
        prop_assert!(classify(&kv.list("").unwrap(), &new).is_empty());
    }

    #[test]
    fn prop_ignore_filter_drops_sentinel_writes(old in flat_map(), new in flat_map()) {
        let filter = ChangeFilter::default().with_ignore(DEFAULT_IGNORE_VALUE);
        let changes = compute_changes(&listing(&old), &new, filter);

        for change in &changes {
            prop_assert_ne!(change.new_value(), Some(DEFAULT_IGNORE_VALUE));
        }
        for (k, v) in &new {
            if v == DEFAULT_IGNORE_VALUE {
                prop_assert!(changes.keys().all(|c| c != k.as_str()));
            }
        }
    }

    #[test]
    fn prop_key_filter_keeps_only_requested_key(
        old in flat_map(),
        new in flat_map(),
        requested in key(),
    ) {
        let filter = ChangeFilter::default().with_key(&requested);
        let changes = compute_changes(&listing(&old), &new, filter);

        prop_assert!(changes.len() <= 1);
        prop_assert!(changes.keys().all(|k| k == requested));

        let unfiltered = classify(&listing(&old), &new);
        let expected: Vec<&Change> = unfiltered.iter().filter(|c| c.key() == requested).collect();
        prop_assert_eq!(changes.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_fail_fast_applies_exact_prefix(new in flat_map(), fail_at in 0usize..8) {
        let kv = FailingAfter::new(fail_at);
        let changes = classify(&[], &new);

        let result = apply_changes(&kv, &changes);

        let attempted = kv.attempted();
        if fail_at < changes.len() {
            prop_assert!(result.is_err());
            prop_assert_eq!(attempted.len(), fail_at + 1);
        } else {
            prop_assert_eq!(result.unwrap(), changes.len());
            prop_assert_eq!(attempted.len(), changes.len());
        }
        let expected: Vec<String> = changes
            .keys()
            .take(attempted.len())
            .map(str::to_string)
            .collect();
        prop_assert_eq!(attempted, expected);
    }
}

/// Store that fails the mutation at a fixed index and records attempts
struct FailingAfter {
    fail_at: usize,
    attempted: std::sync::Mutex<Vec<String>>,
}

impl FailingAfter {
    fn new(fail_at: usize) -> Self {
        Self {
            fail_at,
            attempted: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }

    fn record(&self, key: &str) -> Result<(), kvrecon_core::StoreError> {
        let mut attempted = self.attempted.lock().unwrap();
        attempted.push(key.to_string());
        if attempted.len() == self.fail_at + 1 {
            return Err(kvrecon_core::StoreError::new("boom"));
        }
        Ok(())
    }
}

impl KvStore for FailingAfter {
    fn list(&self, _prefix: &str) -> Result<Vec<KvPair>, kvrecon_core::StoreError> {
        Ok(Vec::new())
    }

    fn put(&self, pair: &KvPair) -> Result<(), kvrecon_core::StoreError> {
        self.record(&pair.key)
    }

    fn delete(&self, key: &str) -> Result<(), kvrecon_core::StoreError> {
        self.record(key)
    }
}
