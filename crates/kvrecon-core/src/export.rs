//! Store export.
//!
//! Rebuilds a nested document from a flat store listing, the inverse of
//! [`crate::flatten`] for string-valued documents. Keys are split on
//! [`PATH_SEPARATOR`]; empty segments are skipped.

use crate::errors::{ReconcileError, Result};
use crate::flatten::PATH_SEPARATOR;
use crate::format::Format;
use crate::kv::KvPair;
use serde_json::{Map, Value};

/// Build the nested document for `pairs`.
///
/// All leaves are strings. When one key is a path prefix of another (both
/// `a` and `a/b` exist) the deeper key wins.
pub fn pairs_to_document(pairs: &[KvPair]) -> Value {
    let mut root = Map::new();

    for pair in pairs {
        let segments: Vec<&str> = pair
            .key
            .split(PATH_SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect();
        insert_path(&mut root, &segments, &pair.value);
    }

    Value::Object(root)
}

fn insert_path(node: &mut Map<String, Value>, segments: &[&str], value: &str) {
    match segments {
        [] => {}
        [leaf] => {
            if !matches!(node.get(*leaf), Some(Value::Object(_))) {
                node.insert(leaf.to_string(), Value::String(value.to_string()));
            }
        }
        [head, rest @ ..] => {
            let slot = node
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = slot {
                insert_path(child, rest, value);
            } else {
                let mut child = Map::new();
                insert_path(&mut child, rest, value);
                *slot = Value::Object(child);
            }
        }
    }
}

/// Serialize `pairs` as a nested document in `format`.
///
/// # Errors
///
/// Returns `Serialization` if the encoder fails.
pub fn export(pairs: &[KvPair], format: Format) -> Result<String> {
    let doc = pairs_to_document(pairs);

    let encoded = match format {
        Format::Json => serde_json::to_string_pretty(&doc).map_err(serialization_error),
        Format::JsonRaw => serde_json::to_string(&doc).map_err(serialization_error),
        Format::Yaml => serde_yaml::to_string(&doc).map_err(serialization_error),
    }?;

    tracing::debug!(format = format.as_str(), pair_count = pairs.len(), "exported store");
    Ok(encoded)
}

fn serialization_error(err: impl std::fmt::Display) -> ReconcileError {
    ReconcileError::Serialization {
        message: err.to_string(),
    }
}
