//! Path-addressed document tree operations
//!
//! This module provides the mutable document tree used by the update
//! engine: path-addressed read, write, and delete over
//! `serde_json::Value`, with auto-vivification of intermediate
//! containers on write.
//!
//! Vivification rules:
//! - A missing object field is created as an empty object or array,
//!   chosen by whether the next path part is an array index.
//! - An array write past the end pads the array with nulls up to the
//!   index.
//! - A *present* scalar (including an explicit null) is never turned
//!   into a container; writing through one is a [`DocumentError`].
//!
//! Objects keep insertion order (`serde_json` with `preserve_order`), so
//! a document read back after mutation renders its fields in a stable
//! order.

use crate::field_path::{FieldRef, PathPart};
use serde_json::Value;
use thiserror::Error;

/// Error type for document tree operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A path part tried to treat a leaf value as a container
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected container type
        expected: &'static str,
        /// Actual type found at that position
        found: &'static str,
    },

    /// The path still contains an unbound positional `$` part
    #[error("unbound positional part in path")]
    UnboundPositional,
}

/// Human-readable type name for error messages
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_mismatch(expected: &'static str, found: &Value) -> DocumentError {
    DocumentError::TypeMismatch {
        expected,
        found: value_type_name(found),
    }
}

/// Empty container appropriate for the given next path part
fn empty_container_for(next: &PathPart) -> Value {
    match next {
        PathPart::Name(_) => Value::Object(serde_json::Map::new()),
        PathPart::Index(_) | PathPart::Positional => Value::Array(Vec::new()),
    }
}

/// Get a reference to the value at `path`, if present
///
/// Returns `None` for an absent path and for any type mismatch along the
/// way; readers cannot distinguish the two, and do not need to.
///
/// # Examples
///
/// ```
/// use docmut_core::document::get_path;
/// use serde_json::json;
///
/// let doc = json!({"user": {"scores": [100, 95]}});
/// let path = "user.scores.1".parse().unwrap();
/// assert_eq!(get_path(&doc, &path), Some(&json!(95)));
/// ```
pub fn get_path<'a>(root: &'a Value, path: &FieldRef) -> Option<&'a Value> {
    let mut current = root;
    for part in path.parts() {
        current = match (part, current) {
            (PathPart::Name(name), Value::Object(map)) => map.get(name)?,
            (PathPart::Index(idx), Value::Array(arr)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Navigate to the parent container of the leaf part, vivifying
/// intermediate containers as needed.
///
/// `parts` is the full part list; the walk covers everything but the
/// last part, using the following part to pick the container kind for
/// anything it has to create.
fn navigate_vivify<'a>(
    root: &'a mut Value,
    parts: &[PathPart],
) -> Result<&'a mut Value, DocumentError> {
    let mut current = root;
    for (i, part) in parts[..parts.len() - 1].iter().enumerate() {
        let next = &parts[i + 1];
        match part {
            PathPart::Name(name) => match current {
                Value::Object(map) => {
                    current = map
                        .entry(name.clone())
                        .or_insert_with(|| empty_container_for(next));
                }
                other => return Err(type_mismatch("object", other)),
            },
            PathPart::Index(idx) => match current {
                Value::Array(arr) => {
                    if *idx >= arr.len() {
                        arr.resize(*idx + 1, Value::Null);
                        arr[*idx] = empty_container_for(next);
                    }
                    current = &mut arr[*idx];
                }
                other => return Err(type_mismatch("array", other)),
            },
            PathPart::Positional => return Err(DocumentError::UnboundPositional),
        }
    }
    Ok(current)
}

/// Set `value` at `path`, creating intermediate containers as needed
///
/// Writing a value equal to the existing one is permitted; no-op
/// detection is a caller concern. An empty path replaces the root.
///
/// # Examples
///
/// ```
/// use docmut_core::document::{get_path, set_path};
/// use serde_json::json;
///
/// let mut doc = json!({});
/// set_path(&mut doc, &"a.b.0".parse().unwrap(), json!(7)).unwrap();
/// assert_eq!(doc, json!({"a": {"b": [7]}}));
/// ```
pub fn set_path(root: &mut Value, path: &FieldRef, value: Value) -> Result<(), DocumentError> {
    let parts = path.parts();
    if parts.is_empty() {
        *root = value;
        return Ok(());
    }

    let parent = navigate_vivify(root, parts)?;
    match parts.last().unwrap() {
        PathPart::Name(name) => match parent {
            Value::Object(map) => {
                map.insert(name.clone(), value);
                Ok(())
            }
            other => Err(type_mismatch("object", other)),
        },
        PathPart::Index(idx) => match parent {
            Value::Array(arr) => {
                if *idx >= arr.len() {
                    arr.resize(*idx + 1, Value::Null);
                }
                arr[*idx] = value;
                Ok(())
            }
            other => Err(type_mismatch("array", other)),
        },
        PathPart::Positional => Err(DocumentError::UnboundPositional),
    }
}

/// Remove the value at `path`
///
/// An object field is removed outright. An array element is replaced
/// with null so sibling indices stay stable. An absent path is a no-op
/// returning `Ok(None)`; traversing through a scalar is an error.
pub fn unset_path(root: &mut Value, path: &FieldRef) -> Result<Option<Value>, DocumentError> {
    let parts = path.parts();
    let mut current = root;
    for (i, part) in parts.iter().enumerate() {
        let last = i + 1 == parts.len();
        match part {
            PathPart::Name(name) => match current {
                Value::Object(map) => {
                    if last {
                        return Ok(map.remove(name));
                    }
                    match map.get_mut(name) {
                        Some(next) => current = next,
                        None => return Ok(None),
                    }
                }
                other => return Err(type_mismatch("object", other)),
            },
            PathPart::Index(idx) => match current {
                Value::Array(arr) => {
                    if last {
                        return Ok(arr
                            .get_mut(*idx)
                            .map(|slot| std::mem::replace(slot, Value::Null)));
                    }
                    match arr.get_mut(*idx) {
                        Some(next) => current = next,
                        None => return Ok(None),
                    }
                }
                other => return Err(type_mismatch("array", other)),
            },
            PathPart::Positional => return Err(DocumentError::UnboundPositional),
        }
    }
    Ok(None)
}

/// Get a mutable reference to the array at `path`, vivifying an empty
/// array if the leaf is absent
///
/// This is the anchor for append operators: the target must resolve to
/// an array or be absent. Anything else is a type mismatch.
pub fn get_or_insert_array<'a>(
    root: &'a mut Value,
    path: &FieldRef,
) -> Result<&'a mut Vec<Value>, DocumentError> {
    let parts = path.parts();
    if parts.is_empty() {
        return Err(type_mismatch("array", root));
    }

    let parent = navigate_vivify(root, parts)?;
    let slot = match parts.last().unwrap() {
        PathPart::Name(name) => match parent {
            Value::Object(map) => map
                .entry(name.clone())
                .or_insert_with(|| Value::Array(Vec::new())),
            other => return Err(type_mismatch("object", other)),
        },
        PathPart::Index(idx) => match parent {
            Value::Array(arr) => {
                if *idx >= arr.len() {
                    arr.resize(*idx + 1, Value::Null);
                    arr[*idx] = Value::Array(Vec::new());
                }
                &mut arr[*idx]
            }
            other => return Err(type_mismatch("array", other)),
        },
        PathPart::Positional => return Err(DocumentError::UnboundPositional),
    };

    match slot {
        Value::Array(arr) => Ok(arr),
        other => Err(type_mismatch("array", other)),
    }
}
