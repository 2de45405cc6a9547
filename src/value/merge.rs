//! Deterministic structural merge.

use super::{Map, Value};

/// Merge `overlay` on top of `base`.
///
/// - mapping + mapping: recursive per key. Keys from `base` keep their
///   position; keys only in `overlay` are appended in `overlay` order.
/// - list + list: `base` followed by `overlay`, no deduplication.
/// - anything else: `overlay` wins outright.
///
/// Only left-to-right application over an ordered list of layers is
/// guaranteed deterministic; the operation is not associative in general.
pub fn merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let existing = std::mem::take(slot);
                        *slot = merge(existing, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (Value::Array(mut base), Value::Array(overlay)) => {
            base.extend(overlay);
            Value::Array(base)
        }
        (_, overlay) => overlay,
    }
}

/// Fold `layers` left to right over an empty mapping.
pub fn merge_all<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    layers
        .into_iter()
        .fold(Value::Object(Map::new()), merge)
}
