//! Reconciler facade with boundary logging.
//!
//! A [`Reconciler`] binds one store handle to its static configuration and
//! exposes the public operations:
//! - `export`: render the whole store as a document
//! - `changes`: compute the changeset for a declared document
//! - `push`: apply a changeset
//! - `reconcile`: `changes` followed by `push`
//!
//! ## Logging Ownership
//!
//! This layer owns lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Every call is tagged with a fresh `request_id`. The reconciler does not
//! serialize concurrent pushes against the same store; the id is what tells
//! interleaved runs apart in the log stream.

use crate::apply::apply_until_failure;
use crate::change::ChangeSet;
use crate::config::StoreConfig;
use crate::diff::{compute_changes, ChangeFilter};
use crate::errors::{ExError, ReconcileError, Result};
use crate::flatten::flatten;
use crate::format::Format;
use crate::kv::KvStore;
use crate::{export, log_op_end, log_op_error, log_op_start};
use kvrecon_core_types::RequestId;
use std::time::Instant;

/// Prefix listed on every read; the reconciler always works on the whole store
const LIST_PREFIX: &str = "";

/// Declared-state reconciler over a key-value store
#[derive(Debug)]
pub struct Reconciler<K> {
    kv: K,
    config: StoreConfig,
}

impl<K: KvStore> Reconciler<K> {
    pub fn new(kv: K, config: StoreConfig) -> Self {
        Self { kv, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &K {
        &self.kv
    }

    /// Accepted document formats, default first
    pub fn formats(&self) -> &'static [Format] {
        &Format::ALL
    }

    pub fn format_is_valid(&self, name: &str) -> bool {
        self.formats().iter().any(|f| f.as_str() == name)
    }

    pub fn default_format(&self) -> Format {
        self.formats()[0]
    }

    /// Render the current store contents as a document in `format`
    ///
    /// # Errors
    ///
    /// - `Store`: listing the store failed
    /// - `Serialization`: encoding the document failed
    pub fn export(&self, format: Format) -> Result<String> {
        let request_id = RequestId::new();
        log_op_start!(
            "export",
            request_id = %request_id,
            format = format.as_str()
        );
        let start = Instant::now();

        let result = self
            .kv
            .list(LIST_PREFIX)
            .map_err(ReconcileError::from)
            .and_then(|pairs| export::export(&pairs, format));

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => log_op_end!(
                "export",
                duration_ms = elapsed,
                request_id = %request_id
            ),
            Err(e) => log_op_error!(
                "export",
                ExError::from(e.clone()).with_request_id(request_id),
                duration_ms = elapsed
            ),
        }
        result
    }

    /// Compute the changeset that makes the store match `document`
    ///
    /// `key`, when non-empty, restricts the result to that single key. The
    /// configured ignore sentinel is applied before the key restriction.
    ///
    /// # Errors
    ///
    /// - `Store`: listing the store failed
    /// - `Parse`: `document` is not well-formed `format`
    pub fn changes(&self, document: &[u8], format: Format, key: &str) -> Result<ChangeSet> {
        let request_id = RequestId::new();
        log_op_start!(
            "changes",
            request_id = %request_id,
            format = format.as_str(),
            key = key
        );
        let start = Instant::now();

        let result = self.changes_impl(document, format, key);

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(changes) => log_op_end!(
                "changes",
                duration_ms = elapsed,
                request_id = %request_id,
                change_count = changes.len()
            ),
            Err(e) => log_op_error!(
                "changes",
                ExError::from(e.clone()).with_request_id(request_id),
                duration_ms = elapsed
            ),
        }
        result
    }

    fn changes_impl(&self, document: &[u8], format: Format, key: &str) -> Result<ChangeSet> {
        let old = self.kv.list(LIST_PREFIX)?;
        let new = flatten(document, format)?;
        let filter = ChangeFilter::new(self.config.ignore_value(), key);
        Ok(compute_changes(&old, &new, filter))
    }

    /// Apply `changes` in order, stopping at the first failure
    ///
    /// Returns the number of changes applied. On failure, changes before the
    /// failing one remain applied and later ones are not attempted.
    ///
    /// # Errors
    ///
    /// - `Store`: the first put or delete that failed
    pub fn push(&self, changes: &ChangeSet) -> Result<usize> {
        let request_id = RequestId::new();
        log_op_start!(
            "push",
            request_id = %request_id,
            change_count = changes.len()
        );
        let start = Instant::now();

        let result = apply_until_failure(&self.kv, changes);

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(applied) => log_op_end!(
                "push",
                duration_ms = elapsed,
                request_id = %request_id,
                applied_count = *applied
            ),
            Err((failed, e)) => log_op_error!(
                "push",
                ExError::from(e.clone())
                    .with_request_id(request_id)
                    .with_key(failed.key()),
                duration_ms = elapsed
            ),
        }
        result.map_err(|(_, e)| e)
    }

    /// Compute and apply the changeset for `document`
    ///
    /// Returns the changeset that was applied.
    ///
    /// # Errors
    ///
    /// Any error from [`Reconciler::changes`] or [`Reconciler::push`].
    pub fn reconcile(&self, document: &[u8], format: Format, key: &str) -> Result<ChangeSet> {
        let changes = self.changes(document, format, key)?;
        self.push(&changes)?;
        Ok(changes)
    }
}
