//! Dotted-path access to JSON resources.
//!
//! Paths are split on `.`. While resolving, arrays are traversed
//! transparently (`tags.name` reaches the `name` of every object in `tags`)
//! unless the segment is a numeric index (`tags.0`).

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::types::Projection;

/// Returns every value reachable through `path`.
pub(crate) fn lookup<'a>(resource: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    collect(resource, &segments, &mut found);
    found
}

fn collect<'a>(value: &'a Value, segments: &[&str], found: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        found.push(value);
        return;
    };

    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*head) {
                collect(child, rest, found);
            }
        }
        Value::Array(items) => match head.parse::<usize>() {
            Ok(index) => {
                if let Some(item) = items.get(index) {
                    collect(item, rest, found);
                }
            }
            Err(_) => {
                for item in items.iter().filter(|item| item.is_object()) {
                    collect(item, segments, found);
                }
            }
        },
        _ => {}
    }
}

/// Returns true if `path` leads to at least one value, `null` included.
pub(crate) fn contains(resource: &Value, path: &str) -> bool {
    !lookup(resource, path).is_empty()
}

/// Copies the part of `value` reachable through `segments`, keeping the
/// enclosing objects.
///
/// Arrays are traversed element by element; object elements without the
/// path project to `{}` and scalar elements are dropped.
fn included(value: &Value, segments: &[&str]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    match value {
        Value::Object(map) => {
            let child = included(map.get(*head)?, rest)?;
            let mut projected = Map::new();
            projected.insert(head.to_string(), child);
            Some(Value::Object(projected))
        }
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| included(item, segments).unwrap_or_else(|| Value::Object(Map::new())))
                .collect(),
        )),
        _ => None,
    }
}

/// Merges a projected fragment into `target`.
fn merge(target: &mut Value, fragment: Value) {
    match (target, fragment) {
        (Value::Object(target), Value::Object(fragment)) => {
            for (key, value) in fragment {
                match target.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(fragment)) if target.len() == fragment.len() => {
            for (existing, value) in target.iter_mut().zip(fragment) {
                merge(existing, value);
            }
        }
        (target, fragment) => *target = fragment,
    }
}

/// Removes `segments` from `value`, traversing arrays element by element.
fn excluded(value: &mut Value, segments: &[&str]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    match value {
        Value::Object(map) if rest.is_empty() => {
            map.remove(*head);
        }
        Value::Object(map) => {
            if let Some(child) = map.get_mut(*head) {
                excluded(child, rest);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| excluded(item, segments)),
        _ => {}
    }
}

/// Sets `value` at `path`, creating missing intermediate objects.
///
/// Fails if an intermediate segment holds something other than an object.
pub(crate) fn set_path(
    target: &mut Map<String, Value>,
    path: &str,
    value: Value,
) -> Result<(), String> {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
            Ok(())
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match child {
                Value::Object(map) => set_path(map, rest, value),
                other => Err(format!(
                    "cannot set '{}' inside '{}' holding a non-object value ({})",
                    rest,
                    head,
                    type_name(other)
                )),
            }
        }
    }
}

/// Removes the value at `path`; returns true if something was removed.
pub(crate) fn remove_path(target: &mut Map<String, Value>, path: &str) -> bool {
    match path.split_once('.') {
        None => target.remove(path).is_some(),
        Some((head, rest)) => match target.get_mut(head) {
            Some(Value::Object(map)) => remove_path(map, rest),
            _ => false,
        },
    }
}

/// Applies a projection to a resource.
///
/// Dotted paths reach into the objects of arrays, for inclusion and
/// exclusion alike.
pub(crate) fn project(resource: &Value, projection: Option<&Projection>) -> Value {
    match projection {
        None => resource.clone(),
        Some(Projection::Include(fields)) => {
            let mut projected = Value::Object(Map::new());
            for field in fields {
                let segments: Vec<&str> = field.split('.').collect();
                if let Some(fragment @ Value::Object(_)) = included(resource, &segments) {
                    merge(&mut projected, fragment);
                }
            }
            projected
        }
        Some(Projection::Exclude(fields)) => {
            let mut projected = resource.clone();
            for field in fields {
                let segments: Vec<&str> = field.split('.').collect();
                excluded(&mut projected, &segments);
            }
            projected
        }
    }
}

/// Total order over JSON values, used for sorting.
///
/// Values of different types order by type: null, numbers, strings,
/// objects, arrays, booleans.
pub(crate) fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .partial_cmp(&y.as_f64().unwrap_or(f64::NAN))
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| compare_json(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()).then_with(|| {
            Value::Object(x.clone())
                .to_string()
                .cmp(&Value::Object(y.clone()).to_string())
        }),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::Bool(_) => "boolean",
    }
}
