//! Modifier application engine
//!
//! Applies a parsed specification to one target document. The engine
//! works on a private copy of the target: the caller's document is the
//! pre-image, the returned document the post-image, and an error means
//! no post-image exists for this document (other documents of a
//! multi-document update are unaffected).
//!
//! While applying, the engine tracks a sticky flag: did any executed
//! operation target a path related to a declared shard-key path? The
//! flag is conservative on purpose. It says "must be checked", not "was
//! changed"; exact change detection is the invariant checker's job.

use crate::error::ApplyError;
use crate::registry::OpKind;
use crate::shard_key::ShardKeyPattern;
use crate::spec::{ModifierOp, Operand, ParsedSpec};
use docmut_core::{get_or_insert_array, set_path, unset_path, DocumentError, FieldRef};
use serde_json::Value;
use std::borrow::Cow;

/// Result of applying a specification to one target document
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// The mutated post-image
    pub document: Value,
    /// True if any executed operation targeted a path related to a
    /// declared shard-key path (or the specification was a Replacement
    /// and a pattern is declared)
    pub mods_affect_shard_keys: bool,
}

/// Apply a parsed specification to `target`
///
/// `matched_field` is the array index selected by the query layer, used
/// to bind positional `$` path parts. `identity_field` is the
/// designated immutable field a Replacement may not change.
pub fn apply_update(
    spec: &ParsedSpec,
    matched_field: Option<&str>,
    target: &Value,
    shard_keys: &ShardKeyPattern,
    identity_field: Option<&str>,
) -> Result<ApplyOutcome, ApplyError> {
    match spec {
        ParsedSpec::Replacement(body) => {
            apply_replacement(body, target, shard_keys, identity_field)
        }
        ParsedSpec::Modifiers(ops) => apply_modifiers(ops, matched_field, target, shard_keys),
    }
}

/// Replace the whole document body, preserving the identity field
///
/// A replacement that omits the designated identity field inherits the
/// target's value; one that carries a different value is rejected.
fn apply_replacement(
    body: &Value,
    target: &Value,
    shard_keys: &ShardKeyPattern,
    identity_field: Option<&str>,
) -> Result<ApplyOutcome, ApplyError> {
    let mut document = body.clone();

    if let Some(field) = identity_field {
        if let (Value::Object(target_map), Value::Object(body_map)) = (target, &mut document) {
            if let Some(existing) = target_map.get(field) {
                match body_map.get(field) {
                    Some(replacement) if replacement != existing => {
                        return Err(ApplyError::IdentityFieldImmutable {
                            field: field.to_string(),
                        })
                    }
                    Some(_) => {}
                    None => {
                        body_map.insert(field.to_string(), existing.clone());
                    }
                }
            }
        }
    }

    // A replacement rewrites every path, so with a declared pattern the
    // shard keys always need checking.
    Ok(ApplyOutcome {
        document,
        mods_affect_shard_keys: !shard_keys.is_empty(),
    })
}

/// Apply modifier operations in flattened order
fn apply_modifiers(
    ops: &[ModifierOp],
    matched_field: Option<&str>,
    target: &Value,
    shard_keys: &ShardKeyPattern,
) -> Result<ApplyOutcome, ApplyError> {
    let mut document = target.clone();
    let mut mods_affect_shard_keys = false;

    for op in ops {
        // Only relevant when building a newly inserted document; an
        // update of an existing document skips it entirely.
        if op.kind == OpKind::SetOnInsertOnly {
            continue;
        }

        let path: Cow<'_, FieldRef> = if op.path.has_positional() {
            match matched_field {
                Some(matched) => Cow::Owned(op.path.bind_positional(matched)),
                None => {
                    return Err(ApplyError::PositionalUnmatched {
                        path: op.path.to_string(),
                    })
                }
            }
        } else {
            Cow::Borrowed(&op.path)
        };

        if !shard_keys.is_empty() && shard_keys.affects(&path) {
            mods_affect_shard_keys = true;
        }

        apply_one(&mut document, &path, &op.operand)
            .map_err(|err| into_apply_error(&path, err))?;
    }

    Ok(ApplyOutcome {
        document,
        mods_affect_shard_keys,
    })
}

/// Apply a single operation at an already-bound path
fn apply_one(document: &mut Value, path: &FieldRef, operand: &Operand) -> Result<(), DocumentError> {
    match operand {
        Operand::Value(value) => set_path(document, path, value.clone()),
        Operand::None => unset_path(document, path).map(|_| ()),
        Operand::Elements(elements) => {
            let arr = get_or_insert_array(document, path)?;
            arr.extend(elements.iter().cloned());
            Ok(())
        }
        Operand::Window { each, slice } => {
            let arr = get_or_insert_array(document, path)?;
            arr.extend(each.iter().cloned());
            if let Some(bound) = slice {
                if *bound >= 0 {
                    arr.truncate(*bound as usize);
                } else {
                    let keep = bound.unsigned_abs() as usize;
                    if arr.len() > keep {
                        arr.drain(..arr.len() - keep);
                    }
                }
            }
            Ok(())
        }
    }
}

fn into_apply_error(path: &FieldRef, err: DocumentError) -> ApplyError {
    match err {
        DocumentError::TypeMismatch { found, .. } => ApplyError::PathConflict {
            path: path.to_string(),
            found,
        },
        // Paths are bound before application; an unbound positional here
        // means the matched field itself contained `$`.
        DocumentError::UnboundPositional => ApplyError::PositionalUnmatched {
            path: path.to_string(),
        },
    }
}
