//! Change model.
//!
//! A [`ChangeSet`] is the ordered batch of store mutations that brings the
//! store in line with a declared document. It can be saved as a JSON plan and
//! pushed later; [`ChangeSet::from_plan_json`] is the one place where a change
//! tag is checked at runtime.

use crate::errors::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single store mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Change {
    /// Key is declared but absent from the store
    Add {
        key: String,
        #[serde(rename = "new")]
        value: String,
    },
    /// Key exists on both sides with different values
    Update {
        key: String,
        old: String,
        new: String,
    },
    /// Key exists in the store but is no longer declared
    Remove { key: String, old: String },
}

impl Change {
    pub fn add(key: impl Into<String>, value: impl Into<String>) -> Self {
        Change::Add {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn update(key: impl Into<String>, old: impl Into<String>, new: impl Into<String>) -> Self {
        Change::Update {
            key: key.into(),
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn remove(key: impl Into<String>, old: impl Into<String>) -> Self {
        Change::Remove {
            key: key.into(),
            old: old.into(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Change::Add { key, .. } | Change::Update { key, .. } | Change::Remove { key, .. } => {
                key
            }
        }
    }

    /// Value the store holds before the change, if any
    pub fn old_value(&self) -> Option<&str> {
        match self {
            Change::Add { .. } => None,
            Change::Update { old, .. } | Change::Remove { old, .. } => Some(old),
        }
    }

    /// Value the store holds after the change, if any
    pub fn new_value(&self) -> Option<&str> {
        match self {
            Change::Add { value, .. } => Some(value),
            Change::Update { new, .. } => Some(new),
            Change::Remove { .. } => None,
        }
    }

    /// Plan tag of this change
    pub fn action(&self) -> &'static str {
        match self {
            Change::Add { .. } => "add",
            Change::Update { .. } => "update",
            Change::Remove { .. } => "remove",
        }
    }
}

/// Untyped change as read from a plan document
#[derive(Debug, Deserialize)]
struct PlanEntry {
    action: String,
    key: String,
    #[serde(default)]
    old: Option<String>,
    #[serde(default)]
    new: Option<String>,
}

impl TryFrom<PlanEntry> for Change {
    type Error = ReconcileError;

    fn try_from(entry: PlanEntry) -> Result<Self> {
        let PlanEntry {
            action,
            key,
            old,
            new,
        } = entry;

        match action.as_str() {
            "add" => Ok(Change::Add {
                value: require(new, "new", &key)?,
                key,
            }),
            "update" => Ok(Change::Update {
                old: require(old, "old", &key)?,
                new: require(new, "new", &key)?,
                key,
            }),
            "remove" => Ok(Change::Remove {
                old: require(old, "old", &key)?,
                key,
            }),
            _ => Err(ReconcileError::UnknownChange { action }),
        }
    }
}

fn require(field: Option<String>, name: &str, key: &str) -> Result<String> {
    field.ok_or_else(|| {
        plan_error(format!(
            "change for key `{}` is missing field `{}`",
            key, name
        ))
    })
}

fn plan_error(message: impl ToString) -> ReconcileError {
    ReconcileError::Parse {
        format: "plan".to_string(),
        message: message.to_string(),
    }
}

/// Ordered sequence of changes; each key appears at most once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(Vec<Change>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.0.push(change);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Change] {
        &self.0
    }

    /// Keys touched by this changeset, in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(Change::key)
    }

    /// Serialize as a compact JSON plan
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_plan_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ReconcileError::Serialization {
            message: e.to_string(),
        })
    }

    /// Parse a JSON plan written by [`ChangeSet::to_plan_json`]
    ///
    /// # Errors
    ///
    /// - `Parse` if the bytes are not a JSON array of change objects, or a
    ///   change lacks a field its action requires
    /// - `Parse` if two changes name the same key
    /// - `UnknownChange` if an action tag is not `add`, `update` or `remove`
    pub fn from_plan_json(bytes: &[u8]) -> Result<Self> {
        let entries: Vec<PlanEntry> = serde_json::from_slice(bytes).map_err(plan_error)?;

        let mut seen = HashSet::with_capacity(entries.len());
        entries
            .into_iter()
            .map(|entry| {
                let change = Change::try_from(entry)?;
                if !seen.insert(change.key().to_string()) {
                    return Err(plan_error(format!(
                        "duplicate change for key `{}`",
                        change.key()
                    )));
                }
                Ok(change)
            })
            .collect::<Result<Vec<_>>>()
            .map(ChangeSet)
    }
}

impl From<Vec<Change>> for ChangeSet {
    fn from(changes: Vec<Change>) -> Self {
        Self(changes)
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
