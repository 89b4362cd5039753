//! Two-way JSON merge patch (RFC 7386) computed from object snapshots.
//!
//! Sending only the fields that changed keeps concurrent edits to other
//! fields of the same object intact.

use serde_json::{Map, Value};

/// Computes the merge patch turning `old` into `new`.
///
/// Objects are compared key by key: new or changed keys carry the new value,
/// removed keys map to `null`, nested objects recurse. Anything that is not
/// an object on both sides, arrays included, is replaced as a whole.
pub fn diff(old: &Value, new: &Value) -> Value {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => Value::Object(diff_objects(old, new)),
        _ => new.clone(),
    }
}

/// True when the patch would not change anything.
pub fn is_empty(patch: &Value) -> bool {
    patch.as_object().is_some_and(Map::is_empty)
}

fn diff_objects(old: &Map<String, Value>, new: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();

    for (key, old_value) in old {
        match new.get(key) {
            None => {
                patch.insert(key.clone(), Value::Null);
            }
            Some(new_value) if new_value != old_value => {
                patch.insert(key.clone(), diff(old_value, new_value));
            }
            Some(_) => {}
        }
    }

    for (key, new_value) in new {
        if !old.contains_key(key) {
            patch.insert(key.clone(), new_value.clone());
        }
    }

    patch
}

#[cfg(test)]
mod tests;
