//! Changeset application
//!
//! ## Ordering Contract
//!
//! [`apply_changes`] walks the changeset in order and issues one store call
//! per change:
//! - **Sequential**: the next call starts only after the previous returned
//! - **Fail-fast**: the first failing call ends the run and its error is returned
//! - **No rollback**: changes before the failing one stay applied; changes
//!   after it are never attempted
//!
//! The store offers only independent per-key put/delete, so there is no
//! multi-key atomicity to preserve.

use crate::change::{Change, ChangeSet};
use crate::errors::{ReconcileError, Result};
use crate::kv::{KvPair, KvStore};

/// Apply `changes` to `kv`, returning the number of changes applied.
///
/// # Errors
///
/// Returns `Store` with the first failure reported by `kv`.
///
/// # Example
///
/// ```
/// use kvrecon_core::apply::apply_changes;
/// use kvrecon_core::change::{Change, ChangeSet};
/// use kvrecon_core::kv::MemoryKv;
///
/// let kv = MemoryKv::new();
/// let changes: ChangeSet = vec![Change::add("app/port", "8080")].into();
///
/// let applied = apply_changes(&kv, &changes).unwrap();
/// assert_eq!(applied, 1);
/// assert_eq!(kv.snapshot()["app/port"], "8080");
/// ```
pub fn apply_changes<K: KvStore + ?Sized>(kv: &K, changes: &ChangeSet) -> Result<usize> {
    apply_until_failure(kv, changes).map_err(|(_, err)| err)
}

/// Like [`apply_changes`], but a failure also names the change that failed.
///
/// # Errors
///
/// Returns the failing change together with its `Store` error.
pub fn apply_until_failure<'a, K: KvStore + ?Sized>(
    kv: &K,
    changes: &'a ChangeSet,
) -> std::result::Result<usize, (&'a Change, ReconcileError)> {
    changes.iter().try_fold(0usize, |applied, change| {
        apply_change(kv, change).map_err(|err| (change, err))?;
        Ok(applied + 1)
    })
}

/// Apply a single change.
///
/// # Errors
///
/// Returns `Store` if the put or delete fails.
pub fn apply_change<K: KvStore + ?Sized>(kv: &K, change: &Change) -> Result<()> {
    tracing::debug!(action = change.action(), key = change.key(), "applying change");

    match change {
        Change::Add { key, value } => kv.put(&KvPair::new(key.clone(), value.clone()))?,
        Change::Update { key, new, .. } => kv.put(&KvPair::new(key.clone(), new.clone()))?,
        Change::Remove { key, .. } => kv.delete(key)?,
    }
    Ok(())
}
