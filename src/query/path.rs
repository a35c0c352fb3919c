//! Dot-path editor over JSON documents
//!
//! Takes dot-notation strings like `query.filtered.query.bool.must.0` and
//! gets, sets, or deletes the value at that position. Numeric segments index
//! arrays; array deletes splice the element out.
//!
//! When a segment is absent from the current node, the resolver can broadcast
//! the operation across every element of the current collection instead. This
//! fan-out behavior is deliberately permissive (it is what lets a single path
//! hit every clause of a response or query tree at once) but it is easy to
//! write more than intended with it, so it is opt-in via [`FanOut::Enabled`]
//! rather than implicit.

use serde_json::Value;

use crate::error::{HolderError, Result};

/// Whether an absent segment broadcasts across the current collection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FanOut {
    /// Absent segments fail path resolution
    Disabled,
    /// Absent segments broadcast the operation across all elements
    Enabled,
}

/// Read the value at a dot-path
///
/// Returns `None` when the path resolves to nothing. With
/// [`FanOut::Enabled`] an absent segment reads across all elements of the
/// current collection and the matches come back as an ordered array.
pub fn get(root: &Value, path: &str, fan_out: FanOut) -> Option<Value> {
    let segments: Vec<&str> = path.split('.').collect();
    get_inner(root, &segments, fan_out)
}

/// Write `value` at a dot-path
///
/// The leaf key is created if absent; intermediate segments must already
/// exist. Returns [`HolderError::PathNotFound`] when nothing was written.
pub fn set(root: &mut Value, path: &str, value: &Value, fan_out: FanOut) -> Result<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if set_inner(root, &segments, value, fan_out) == 0 {
        return Err(HolderError::PathNotFound(path.to_string()));
    }
    Ok(())
}

/// Delete the value at a dot-path
///
/// Deleting a numeric segment from an array splices the element out rather
/// than leaving a null hole. Returns [`HolderError::PathNotFound`] when
/// nothing was deleted.
pub fn delete(root: &mut Value, path: &str, fan_out: FanOut) -> Result<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if delete_inner(root, &segments, fan_out) == 0 {
        return Err(HolderError::PathNotFound(path.to_string()));
    }
    Ok(())
}

fn parse_index(segment: &str) -> Option<usize> {
    segment.parse().ok()
}

fn get_inner(node: &Value, segments: &[&str], fan_out: FanOut) -> Option<Value> {
    let Some((&segment, rest)) = segments.split_first() else {
        return Some(node.clone());
    };

    match node {
        Value::Object(map) => {
            if let Some(child) = map.get(segment) {
                get_inner(child, rest, fan_out)
            } else if fan_out == FanOut::Enabled {
                let matches: Vec<Value> = map
                    .values()
                    .filter_map(|child| get_inner(child, segments, fan_out))
                    .collect();
                if matches.is_empty() {
                    None
                } else {
                    Some(Value::Array(matches))
                }
            } else {
                None
            }
        }
        Value::Array(items) => {
            if let Some(index) = parse_index(segment) {
                items.get(index).and_then(|child| get_inner(child, rest, fan_out))
            } else if fan_out == FanOut::Enabled {
                let matches: Vec<Value> = items
                    .iter()
                    .filter_map(|child| get_inner(child, segments, fan_out))
                    .collect();
                if matches.is_empty() {
                    None
                } else {
                    Some(Value::Array(matches))
                }
            } else {
                None
            }
        }
        _ => None,
    }
}

fn set_inner(node: &mut Value, segments: &[&str], value: &Value, fan_out: FanOut) -> usize {
    let (&segment, rest) = match segments.split_first() {
        Some(split) => split,
        None => return 0,
    };

    if rest.is_empty() {
        return match node {
            Value::Object(map) => {
                if map.contains_key(segment) || fan_out == FanOut::Disabled {
                    map.insert(segment.to_string(), value.clone());
                    1
                } else {
                    map.values_mut()
                        .map(|child| set_leaf(child, segment, value))
                        .sum()
                }
            }
            Value::Array(items) => {
                if let Some(index) = parse_index(segment) {
                    match items.get_mut(index) {
                        Some(slot) => {
                            *slot = value.clone();
                            1
                        }
                        None => 0,
                    }
                } else if fan_out == FanOut::Enabled {
                    items
                        .iter_mut()
                        .map(|child| set_leaf(child, segment, value))
                        .sum()
                } else {
                    0
                }
            }
            _ => 0,
        };
    }

    match node {
        Value::Object(map) => {
            if let Some(child) = map.get_mut(segment) {
                set_inner(child, rest, value, fan_out)
            } else if fan_out == FanOut::Enabled {
                map.values_mut()
                    .map(|child| set_inner(child, segments, value, fan_out))
                    .sum()
            } else {
                0
            }
        }
        Value::Array(items) => {
            if let Some(index) = parse_index(segment) {
                match items.get_mut(index) {
                    Some(child) => set_inner(child, rest, value, fan_out),
                    None => 0,
                }
            } else if fan_out == FanOut::Enabled {
                items
                    .iter_mut()
                    .map(|child| set_inner(child, segments, value, fan_out))
                    .sum()
            } else {
                0
            }
        }
        _ => 0,
    }
}

fn set_leaf(node: &mut Value, key: &str, value: &Value) -> usize {
    match node.as_object_mut() {
        Some(map) => {
            map.insert(key.to_string(), value.clone());
            1
        }
        None => 0,
    }
}

fn delete_inner(node: &mut Value, segments: &[&str], fan_out: FanOut) -> usize {
    let (&segment, rest) = match segments.split_first() {
        Some(split) => split,
        None => return 0,
    };

    if rest.is_empty() {
        return match node {
            Value::Object(map) => {
                if map.remove(segment).is_some() {
                    1
                } else if fan_out == FanOut::Enabled {
                    map.values_mut()
                        .map(|child| delete_leaf(child, segment))
                        .sum()
                } else {
                    0
                }
            }
            Value::Array(items) => {
                if let Some(index) = parse_index(segment) {
                    if index < items.len() {
                        items.remove(index);
                        1
                    } else {
                        0
                    }
                } else if fan_out == FanOut::Enabled {
                    items
                        .iter_mut()
                        .map(|child| delete_leaf(child, segment))
                        .sum()
                } else {
                    0
                }
            }
            _ => 0,
        };
    }

    match node {
        Value::Object(map) => {
            if let Some(child) = map.get_mut(segment) {
                delete_inner(child, rest, fan_out)
            } else if fan_out == FanOut::Enabled {
                map.values_mut()
                    .map(|child| delete_inner(child, segments, fan_out))
                    .sum()
            } else {
                0
            }
        }
        Value::Array(items) => {
            if let Some(index) = parse_index(segment) {
                match items.get_mut(index) {
                    Some(child) => delete_inner(child, rest, fan_out),
                    None => 0,
                }
            } else if fan_out == FanOut::Enabled {
                items
                    .iter_mut()
                    .map(|child| delete_inner(child, segments, fan_out))
                    .sum()
            } else {
                0
            }
        }
        _ => 0,
    }
}

fn delete_leaf(node: &mut Value, key: &str) -> usize {
    match node.as_object_mut() {
        Some(map) => usize::from(map.remove(key).is_some()),
        None => 0,
    }
}
