//! Nested-path access over untyped JSON records.
//!
//! Catalog records arrive as `serde_json::Value` trees. Validators and the
//! auto-fixer address fields with dotted/bracketed locators such as
//! `attachNodes[2].orientation` and must never panic on malformed shapes, so
//! every accessor here returns `Option` or a change list instead of indexing.

use serde::Serialize;
use serde_json::{Map, Value};

/// One step of a parsed field locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A single field rewritten by [`merge_defaults`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub path: String,
    pub old: Value,
    pub new: Value,
}

/// Parse `a.b[0].c` into segments. Empty input addresses the root.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut key = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
            }
            '[' => {
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
                let mut digits = String::new();
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    digits.push(inner);
                }
                match digits.trim().parse::<usize>() {
                    Ok(index) => segments.push(PathSegment::Index(index)),
                    Err(_) => segments.push(PathSegment::Key(digits)),
                }
            }
            other => key.push(other),
        }
    }
    if !key.is_empty() {
        segments.push(PathSegment::Key(key));
    }
    segments
}

/// Append an object key to a locator.
pub fn join_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

/// Append an array index to a locator.
pub fn index_path(base: &str, index: usize) -> String {
    format!("{base}[{index}]")
}

/// Resolve a locator against `value`.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    parse_path(path)
        .iter()
        .try_fold(value, |current, segment| match segment {
            PathSegment::Key(key) => current.as_object()?.get(key),
            PathSegment::Index(index) => current.as_array()?.get(*index),
        })
}

/// Resolve a locator, treating JSON `null` as absent.
pub fn get_present<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    get_path(value, path).filter(|v| !v.is_null())
}

pub fn get_f64(value: &Value, path: &str) -> Option<f64> {
    get_path(value, path).and_then(Value::as_f64)
}

pub fn get_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    get_path(value, path).and_then(Value::as_str)
}

pub fn get_bool(value: &Value, path: &str) -> Option<bool> {
    get_path(value, path).and_then(Value::as_bool)
}

/// True when the field is absent or `null`.
pub fn is_missing(value: &Value, path: &str) -> bool {
    get_present(value, path).is_none()
}

/// Write `new_value` at `path`, creating intermediate objects and padding
/// arrays with `null` as required. Returns `false` when an existing
/// intermediate value has an incompatible shape (e.g. indexing into a string).
pub fn set_path(value: &mut Value, path: &str, new_value: Value) -> bool {
    let segments = parse_path(path);
    let Some((last, parents)) = segments.split_last() else {
        *value = new_value;
        return true;
    };

    let mut current = value;
    for (position, segment) in parents.iter().enumerate() {
        let next_is_index = matches!(
            segments.get(position + 1),
            Some(PathSegment::Index(_))
        );
        let slot = match slot_mut(current, segment) {
            Some(slot) => slot,
            None => return false,
        };
        if slot.is_null() {
            *slot = if next_is_index {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            };
        }
        current = slot;
    }

    match slot_mut(current, last) {
        Some(slot) => {
            *slot = new_value;
            true
        }
        None => false,
    }
}

fn slot_mut<'a>(current: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    if current.is_null() {
        *current = match segment {
            PathSegment::Key(_) => Value::Object(Map::new()),
            PathSegment::Index(_) => Value::Array(Vec::new()),
        };
    }
    match segment {
        PathSegment::Key(key) => Some(
            current
                .as_object_mut()?
                .entry(key.clone())
                .or_insert(Value::Null),
        ),
        PathSegment::Index(index) => {
            let items = current.as_array_mut()?;
            if items.len() <= *index {
                items.resize(*index + 1, Value::Null);
            }
            items.get_mut(*index)
        }
    }
}

/// Fill absent or `null` fields of `target` from `defaults`, recursing into
/// nested objects. Present non-null values are never overwritten. Returns every
/// field that changed, in the order visited.
pub fn merge_defaults(target: &mut Value, defaults: &Value) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    merge_into(target, defaults, "", &mut changes);
    changes
}

fn merge_into(target: &mut Value, defaults: &Value, base: &str, changes: &mut Vec<FieldChange>) {
    let (Some(target_map), Some(default_map)) = (target.as_object_mut(), defaults.as_object())
    else {
        return;
    };

    for (key, default_value) in default_map {
        let path = join_path(base, key);
        if target_map.get(key).is_none_or(Value::is_null) {
            let old = target_map
                .insert(key.clone(), default_value.clone())
                .unwrap_or(Value::Null);
            changes.push(FieldChange {
                path,
                old,
                new: default_value.clone(),
            });
        } else if let Some(existing) = target_map.get_mut(key) {
            if existing.is_object() && default_value.is_object() {
                merge_into(existing, default_value, &path, changes);
            }
        }
    }
}

/// Structural equality that compares numbers by value, so `1` equals `1.0`.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| deep_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Short type label used in findings ("number", "string", ...).
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
