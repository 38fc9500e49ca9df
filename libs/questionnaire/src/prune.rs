//! Emptiness and pruning
//!
//! A JSON value is empty when it is `null`, an empty string, or an array or
//! object whose members are all empty. Numbers and booleans are never
//! empty. Pruning removes empty members bottom-up; the value passed in is
//! never removed itself, even when it ends up empty.

use serde_json::Value;

/// Key prefix of builder-internal members
pub const INTERNAL_PREFIX: &str = "__$";

pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(_) | Value::Number(_) => false,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.iter().all(is_empty),
        Value::Object(members) => members.values().all(is_empty),
    }
}

/// Remove empty array elements and empty object members, depth first.
///
/// `null` elements are dropped from arrays before recursing into them.
pub fn prune_empty(value: &mut Value) {
    prune(value, false);
}

/// [`prune_empty`], additionally dropping every `__$`-prefixed key.
pub fn prune_internal_and_empty(value: &mut Value) {
    prune(value, true);
}

fn prune(value: &mut Value, strip_internal: bool) {
    match value {
        Value::Array(items) => {
            items.retain(|item| !item.is_null());
            for item in items.iter_mut() {
                prune(item, strip_internal);
            }
            items.retain(|item| !is_empty(item));
        }
        Value::Object(members) => {
            if strip_internal {
                members.retain(|key, _| !key.starts_with(INTERNAL_PREFIX));
            }
            for member in members.values_mut() {
                prune(member, strip_internal);
            }
            members.retain(|_, member| !is_empty(member));
        }
        _ => {}
    }
}

/// True if an `__$` key remains anywhere under `value`.
pub fn has_internal_keys(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(has_internal_keys),
        Value::Object(members) => members
            .iter()
            .any(|(key, member)| key.starts_with(INTERNAL_PREFIX) || has_internal_keys(member)),
        _ => false,
    }
}
