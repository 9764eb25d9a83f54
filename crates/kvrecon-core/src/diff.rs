//! Changeset computation.
//!
//! Compares the store's current listing with a flattened declared document.
//! Keys are visited in listing order first, then keys that only the
//! document declares, in [`FlatMap`] order.
//!
//! ## Classification
//!
//! | store | document | change |
//! |---|---|---|
//! | absent | present | `Add` |
//! | present | present, different | `Update` |
//! | present | absent | `Remove` |
//! | present | present, equal | none |
//!
//! The [`ChangeFilter`] is applied afterwards: first the ignore sentinel,
//! then the single-key restriction.

use crate::change::{Change, ChangeSet};
use crate::flatten::FlatMap;
use crate::kv::KvPair;
use std::collections::HashSet;

/// Post-classification filters
///
/// An empty string disables the corresponding filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeFilter<'a> {
    ignore: Option<&'a str>,
    key: Option<&'a str>,
}

impl<'a> ChangeFilter<'a> {
    /// Filter with both the ignore sentinel and the key restriction
    pub fn new(ignore: &'a str, key: &'a str) -> Self {
        Self::default().with_ignore(ignore).with_key(key)
    }

    /// Drop Add/Update whose new value equals `ignore`
    pub fn with_ignore(mut self, ignore: &'a str) -> Self {
        self.ignore = non_empty(ignore);
        self
    }

    /// Drop every change whose key is not `key`
    pub fn with_key(mut self, key: &'a str) -> Self {
        self.key = non_empty(key);
        self
    }

    pub fn ignore(&self) -> Option<&'a str> {
        self.ignore
    }

    pub fn key(&self) -> Option<&'a str> {
        self.key
    }

    fn keeps(&self, change: &Change) -> bool {
        if let (Some(ignore), Some(new)) = (self.ignore, change.new_value()) {
            if new == ignore {
                return false;
            }
        }
        match self.key {
            Some(key) => change.key() == key,
            None => true,
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Classify every differing key, without filtering.
///
/// Duplicate keys in `old` are collapsed; the first occurrence wins.
pub fn classify(old: &[KvPair], new: &FlatMap) -> ChangeSet {
    let mut seen: HashSet<&str> = HashSet::with_capacity(old.len());
    let mut changes = ChangeSet::new();

    for pair in old {
        if !seen.insert(pair.key.as_str()) {
            continue;
        }
        match new.get(&pair.key) {
            None => changes.push(Change::remove(pair.key.clone(), pair.value.clone())),
            Some(value) if *value != pair.value => changes.push(Change::update(
                pair.key.clone(),
                pair.value.clone(),
                value.clone(),
            )),
            Some(_) => {}
        }
    }

    for (key, value) in new {
        if !seen.contains(key.as_str()) {
            changes.push(Change::add(key.clone(), value.clone()));
        }
    }

    changes
}

/// Compute the filtered, ordered changeset that turns `old` into `new`.
pub fn compute_changes(old: &[KvPair], new: &FlatMap, filter: ChangeFilter<'_>) -> ChangeSet {
    let classified = classify(old, new);
    let total = classified.len();

    let changes: ChangeSet = classified
        .into_iter()
        .filter(|c| filter.keeps(c))
        .collect();

    tracing::debug!(
        old_len = old.len(),
        new_len = new.len(),
        classified = total,
        change_count = changes.len(),
        "computed changes"
    );
    changes
}
