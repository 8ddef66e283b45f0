//! Dot-path addressing over nested JSON property maps.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

fn segments(key: &str) -> Result<Vec<&str>> {
    if key.is_empty() {
        return Err(Error::invalid_argument("property key must be a non-empty string"));
    }
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(Error::invalid_argument(format!(
            "property key '{}' contains an empty path segment",
            key
        )));
    }
    Ok(parts)
}

/// Resolve `a.b.c` against nested objects. Invalid keys resolve to nothing.
pub(crate) fn lookup<'a>(props: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let parts = segments(key).ok()?;
    let (last, parents) = parts.split_last()?;
    let mut current = props;
    for part in parents {
        current = current.get(*part)?.as_object()?;
    }
    current.get(*last)
}

/// Write `value` at `a.b.c`, creating intermediate objects as needed.
///
/// Non-object intermediates are replaced by empty objects.
pub(crate) fn assign(props: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    let parts = segments(key)?;
    let Some((last, parents)) = parts.split_last() else {
        return Ok(());
    };
    let mut current = props;
    for part in parents {
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            tracing::trace!(key, segment = *part, "overwriting non-object property");
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return Err(Error::invalid_argument(format!(
                "property path '{}' does not resolve to an object at '{}'",
                key, part
            )));
        };
        current = map;
    }
    current.insert(last.to_string(), value);
    Ok(())
}

/// Remove the value at `a.b.c`, returning it when present.
pub(crate) fn remove(props: &mut Map<String, Value>, key: &str) -> Option<Value> {
    let parts = segments(key).ok()?;
    let (last, parents) = parts.split_last()?;
    let mut current = props;
    for part in parents {
        current = current.get_mut(*part)?.as_object_mut()?;
    }
    current.shift_remove(*last)
}
