//! Map primitives for in-place document transforms.
//!
//! Documents stay `serde_json::Value` trees through the whole pipeline
//! (key order preserved), and every schema transform is built from the
//! two idempotent primitives here: a rename that only fires when the old
//! key exists and the new one does not, and a default-fill that only
//! fires when the key is absent. Re-running either is a no-op.

use serde_json::{Map, Value};

/// Move `old` to `new`, only when `old` exists and `new` does not. The
/// moved value lands at the end of the map, so repeated runs keep key
/// order stable.
pub fn rename(map: &mut Map<String, Value>, old: &str, new: &str) {
    if map.contains_key(new) {
        return;
    }
    if let Some(value) = map.shift_remove(old) {
        map.insert(new.to_string(), value);
    }
}

/// Set `key` to `default` only when absent.
pub fn fill(map: &mut Map<String, Value>, key: &str, default: Value) {
    map.entry(key).or_insert(default);
}

/// Truthiness in the sense the legacy data relied on: null, false, zero,
/// and empty strings/arrays/objects are all false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a scalar for interpolation into rebuilt notes text: strings
/// bare, everything else in its JSON form.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
