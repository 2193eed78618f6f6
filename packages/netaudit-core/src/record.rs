//! Traversal helpers for nested records returned by the source of truth.
//!
//! Infrahub wraps attributes as `{ "value": ... }` and relationships as
//! `{ "node": { ... } }`, so most lookups are dotted paths through objects.

use serde_json::Value;

/// Sub-keys probed, in order, when testing whether a field is set
const FIELD_SUFFIXES: [&str; 4] = ["value", "node", "count", "edges"];

/// Follow a dotted path (`"site.node.name.value"`) through nested objects.
///
/// Returns `None` as soon as a segment is missing or a non-object is reached.
pub fn extract_value<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, key| current.as_object()?.get(key))
}

/// String form of the value at `path`, if it is a string or a number
pub fn extract_str(record: &Value, path: &str) -> Option<String> {
    match extract_value(record, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_present(value: &Value, suffix: &str) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) if suffix == "count" => n.as_f64().is_some_and(|v| v != 0.0),
        Value::Number(_) | Value::Bool(_) => true,
    }
}

/// The first present value among `field.value`, `field.node`, `field.count`
/// and `field.edges`.
///
/// Null, empty strings and empty collections count as absent, as does a
/// relationship `count` of zero. `false` is a real value.
pub fn field_value<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    let container = record.as_object()?.get(field)?;
    FIELD_SUFFIXES.iter().find_map(|suffix| {
        container
            .get(suffix)
            .filter(|v| is_present(v, suffix))
    })
}

/// Whether a field is set on the record
pub fn has_field(record: &Value, field: &str) -> bool {
    field_value(record, field).is_some()
}

/// Human-readable text for an attribute or a related node's name
pub fn display_value(record: &Value, field: &str) -> Option<String> {
    extract_str(record, &format!("{}.value", field))
        .or_else(|| extract_str(record, &format!("{}.node.name.value", field)))
        .filter(|s| !s.is_empty())
}

/// `name.value` of a record
pub fn object_name(record: &Value) -> Option<String> {
    extract_str(record, "name.value")
}

/// `id` of a record
pub fn object_id(record: &Value) -> Option<String> {
    extract_str(record, "id")
}

/// Numeric `field.value` or `field.count`, zero when absent
pub fn count_value(record: &Value, field: &str) -> u64 {
    ["value", "count"]
        .iter()
        .find_map(|suffix| extract_value(record, &format!("{}.{}", field, suffix))?.as_u64())
        .unwrap_or(0)
}
