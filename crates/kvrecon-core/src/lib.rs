//! kvrecon core - declared-state reconciliation for key-value stores
//!
//! This crate turns a hierarchical configuration document into the minimal
//! set of writes that makes a flat key-value store match it:
//! - Flattening JSON/YAML documents into path-keyed string maps
//! - Diffing the flat map against the store's current listing
//! - Applying the resulting changeset in order, fail-fast
//! - Exporting the store back into a nested document
//!
//! The store itself sits behind the [`KvStore`] trait so network clients can
//! be plugged in by the embedding application.

pub use kvrecon_core_types;

pub mod apply;
pub mod change;
pub mod config;
pub mod diff;
pub mod errors;
pub mod export;
pub mod flatten;
pub mod format;
pub mod kv;
pub mod logging_facility;
pub mod reconciler;

pub use change::{Change, ChangeSet};
pub use config::{Endpoint, StoreConfig, DEFAULT_IGNORE_VALUE};
pub use diff::ChangeFilter;
pub use errors::{ExError, ExErrorKind, ReconcileError, Result};
pub use flatten::FlatMap;
pub use format::Format;
pub use kv::{KvPair, KvStore, MemoryKv, StoreError};
pub use reconciler::Reconciler;
