//! Open-shaped structured values.
//!
//! Layer files and policy fragments are genuinely shapeless until decoded, so
//! they are carried as [`Value`] (a tagged union of object/array/string/number/
//! bool/null with insertion-ordered objects). Everything downstream of the
//! inventory decoder works on typed records instead.

mod merge;


pub use merge::{merge, merge_all};
pub use serde_json::{Map, Value};

/// Trim, drop empties, and deduplicate keeping the first occurrence.
pub fn unique_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for raw in values {
        let item = raw.as_ref().trim();
        if item.is_empty() || out.iter().any(|seen| seen == item) {
            continue;
        }
        out.push(item.to_string());
    }
    out
}

/// Short human name for the shape of a value, used in structural messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
