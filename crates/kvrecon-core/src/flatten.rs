//! Document flattening.
//!
//! A declared configuration document is parsed into a generic tree and then
//! walked depth-first. Every leaf becomes one [`FlatMap`] entry whose key is
//! the `/`-joined path of map keys and sequence indices leading to it.
//!
//! Only the parse step depends on the [`Format`]; the walk is shared, so the
//! same logical document yields the same map in every encoding.

use crate::errors::{ReconcileError, Result};
use crate::format::Format;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Separator between path segments in store keys
pub const PATH_SEPARATOR: char = '/';

/// Flattened path→value view of a document
pub type FlatMap = BTreeMap<String, String>;

/// Parse `bytes` in `format` and flatten the result.
///
/// # Errors
///
/// Returns `Parse` when the bytes are not well-formed for `format`, or when
/// the document root is a scalar or a sequence.
pub fn flatten(bytes: &[u8], format: Format) -> Result<FlatMap> {
    let doc = parse_document(bytes, format)?;
    let flat = flatten_value(&doc);
    tracing::debug!(format = format.as_str(), pair_count = flat.len(), "flattened document");
    Ok(flat)
}

/// Flatten an already parsed document tree.
pub fn flatten_value(doc: &Value) -> FlatMap {
    let mut out = FlatMap::new();
    walk(doc, "", &mut out);
    out
}

/// Parse `bytes` into a generic tree according to `format`.
///
/// A null root yields an empty map. Blank input is an empty YAML document,
/// but it is not valid JSON.
///
/// # Errors
///
/// Returns `Parse` for malformed input or a non-map root.
pub fn parse_document(bytes: &[u8], format: Format) -> Result<Value> {
    let doc = match format {
        Format::Json | Format::JsonRaw => {
            serde_json::from_slice::<Value>(bytes).map_err(|e| parse_error(format, e))?
        }
        Format::Yaml if bytes.iter().all(u8::is_ascii_whitespace) => Value::Null,
        Format::Yaml => {
            let mut yaml: serde_yaml::Value =
                serde_yaml::from_slice(bytes).map_err(|e| parse_error(format, e))?;
            // `<<` keys stay literal until merged
            yaml.apply_merge().map_err(|e| parse_error(format, e))?;
            yaml_to_json(yaml).map_err(|message| ReconcileError::Parse {
                format: format.to_string(),
                message,
            })?
        }
    };

    match doc {
        Value::Object(_) => Ok(doc),
        Value::Null => Ok(Value::Object(Map::new())),
        other => Err(ReconcileError::Parse {
            format: format.to_string(),
            message: format!("document root must be a map, got {}", kind_name(&other)),
        }),
    }
}

fn parse_error(format: Format, err: impl std::fmt::Display) -> ReconcileError {
    ReconcileError::Parse {
        format: format.to_string(),
        message: err.to_string(),
    }
}

fn walk(value: &Value, path: &str, out: &mut FlatMap) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, &join(path, key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &join(path, &index.to_string()), out);
            }
        }
        leaf => {
            out.insert(path.to_string(), leaf_string(leaf));
        }
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", path, PATH_SEPARATOR, segment)
    }
}

fn leaf_string(leaf: &Value) -> String {
    match leaf {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Containers never reach here; walk() recurses into them.
        Value::Object(_) | Value::Array(_) => String::new(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a map",
    }
}

/// Convert a YAML tree into the JSON tree the walker understands.
///
/// Scalar map keys are stringified, tags are dropped. Map keys that are
/// themselves maps or sequences have no path form and are rejected.
fn yaml_to_json(value: serde_yaml::Value) -> std::result::Result<Value, String> {
    use serde_yaml::Value as Y;

    Ok(match value {
        Y::Null => Value::Null,
        Y::Bool(b) => Value::Bool(b),
        Y::Number(n) => yaml_number(&n),
        Y::String(s) => Value::String(s),
        Y::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        ),
        Y::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, child) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(child)?);
            }
            Value::Object(map)
        }
        Y::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            // .nan and .inf have no JSON number form
            .unwrap_or_else(|| Value::String(n.to_string()))
    }
}

fn yaml_key(key: serde_yaml::Value) -> std::result::Result<String, String> {
    use serde_yaml::Value as Y;

    match key {
        Y::String(s) => Ok(s),
        Y::Number(n) => Ok(n.to_string()),
        Y::Bool(b) => Ok(b.to_string()),
        Y::Null => Ok("null".to_string()),
        Y::Tagged(tagged) => yaml_key(tagged.value),
        Y::Sequence(_) | Y::Mapping(_) => Err("map keys must be scalars".to_string()),
    }
}
