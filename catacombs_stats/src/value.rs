//! Lenient readers for loosely typed JSON numbers and objects.

use serde_json::{Map, Value};

pub(crate) fn object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

/// Non-negative whole number; floats are floored, anything else is `None`.
pub(crate) fn optional_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    if value.as_i64().is_some() {
        // negative integer
        return Some(0);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f > 0.0 {
        Some(f.floor() as u64)
    } else {
        Some(0)
    }
}

pub(crate) fn count(value: &Value) -> u64 {
    optional_count(value).unwrap_or(0)
}

pub(crate) fn float(value: &Value) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

/// Follows `path` through nested objects.
pub(crate) fn path<'a>(root: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = root;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last)
}
