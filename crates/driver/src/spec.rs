//! Update specification parsing
//!
//! Turns a raw specification document into either a whole-document
//! Replacement or an ordered list of typed modifier operations. All
//! validation happens here; the application engine assumes a parsed
//! specification is well-formed.
//!
//! Classification looks only at top-level keys: all operator-sigil keys
//! is a modifier-set, no operator-sigil keys is a Replacement, a mix of
//! the two is an error. `{}` therefore classifies as a Replacement with
//! an empty body.

use crate::error::ParseError;
use crate::registry::{self, OpKind};
use docmut_core::{value_type_name, FieldRef};
use serde_json::Value;

/// Typed operand of one modifier operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Value to write (`$set`, `$setOnInsert`)
    Value(Value),
    /// No operand; the per-path value is conventional (`$unset`)
    None,
    /// Elements to append in order (`$pushAll`)
    Elements(Vec<Value>),
    /// Elements to append plus an optional bounded window (`$push`)
    Window {
        /// Elements appended in order
        each: Vec<Value>,
        /// Window bound: negative keeps that many elements from the
        /// end, positive from the front, `None` keeps everything
        slice: Option<i64>,
    },
}

/// One flattened (operator, path, operand) instruction
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierOp {
    /// Which application rule to run
    pub kind: OpKind,
    /// The target path, as written in the specification
    pub path: FieldRef,
    /// The validated, typed operand
    pub operand: Operand,
}

/// A successfully parsed update specification
///
/// Either a non-empty ordered list of modifier operations or a single
/// whole-document replacement, never both and never neither.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedSpec {
    /// Replace the whole document body
    Replacement(Value),
    /// Apply these operations in order
    Modifiers(Vec<ModifierOp>),
}

impl ParsedSpec {
    /// Number of flattened modifier operations (0 for a Replacement)
    pub fn num_mods(&self) -> usize {
        match self {
            ParsedSpec::Replacement(_) => 0,
            ParsedSpec::Modifiers(ops) => ops.len(),
        }
    }

    /// True iff the specification replaces the whole document
    pub fn is_doc_replacement(&self) -> bool {
        matches!(self, ParsedSpec::Replacement(_))
    }
}

/// Parse and validate a raw specification document
///
/// Pure and deterministic: no mutation, no I/O. Key order in the
/// specification is preserved in the flattened operation list.
pub fn parse_spec(spec: &Value) -> Result<ParsedSpec, ParseError> {
    let map = match spec {
        Value::Object(map) => map,
        other => {
            return Err(ParseError::NotADocument {
                found: value_type_name(other),
            })
        }
    };

    // Classify by top-level keys.
    let first_sigil = map.keys().find(|k| registry::is_operator_key(k));
    let first_plain = map.keys().find(|k| !registry::is_operator_key(k));
    match (first_sigil, first_plain) {
        (Some(sigil), Some(plain)) => {
            return Err(ParseError::MixedMode {
                sigil_key: sigil.clone(),
                plain_key: plain.clone(),
            })
        }
        (None, _) => return Ok(ParsedSpec::Replacement(spec.clone())),
        (Some(_), None) => {}
    }

    // Modifier-set mode: flatten in key order, validating as we go.
    let mut ops = Vec::new();
    for (name, operand_doc) in map {
        let descriptor = registry::lookup(name).ok_or_else(|| ParseError::UnknownOperator {
            name: name.clone(),
        })?;

        let targets = match operand_doc {
            Value::Object(targets) => targets,
            other => {
                return Err(ParseError::OperandShape {
                    operator: name.clone(),
                    detail: format!(
                        "expected a document of path/value pairs, found {}",
                        value_type_name(other)
                    ),
                })
            }
        };
        if targets.is_empty() {
            return Err(ParseError::EmptyOperator {
                operator: name.clone(),
            });
        }

        for (path_str, value) in targets {
            let path: FieldRef =
                path_str
                    .parse()
                    .map_err(|source| ParseError::InvalidPath {
                        path: path_str.clone(),
                        source,
                    })?;
            let operand = parse_operand(name, descriptor.kind, path_str, value)?;
            ops.push(ModifierOp {
                kind: descriptor.kind,
                path,
                operand,
            });
        }
    }

    enforce_path_distinctness(&ops)?;
    Ok(ParsedSpec::Modifiers(ops))
}

/// Validate and type one per-path operand value
fn parse_operand(
    operator: &str,
    kind: OpKind,
    path: &str,
    value: &Value,
) -> Result<Operand, ParseError> {
    match kind {
        OpKind::SetValue | OpKind::SetOnInsertOnly => Ok(Operand::Value(value.clone())),
        OpKind::UnsetValue => Ok(Operand::None),
        OpKind::AppendAll => match value {
            Value::Array(elements) => Ok(Operand::Elements(elements.clone())),
            other => Err(ParseError::OperandShape {
                operator: operator.to_string(),
                detail: format!(
                    "expected an array for path '{}', found {}",
                    path,
                    value_type_name(other)
                ),
            }),
        },
        OpKind::AppendWithSliceWindow => parse_window_operand(operator, path, value),
    }
}

/// Parse a `$push` operand: a plain value, or `{$each: [...]}` with an
/// optional integer `$slice`
fn parse_window_operand(operator: &str, path: &str, value: &Value) -> Result<Operand, ParseError> {
    let clauses = match value {
        Value::Object(map) if map.contains_key("$each") => map,
        // A plain value, object included, appends as a single element.
        _ => {
            return Ok(Operand::Window {
                each: vec![value.clone()],
                slice: None,
            })
        }
    };

    let mut each = Vec::new();
    let mut slice = None;
    for (clause, clause_value) in clauses {
        match clause.as_str() {
            "$each" => match clause_value {
                Value::Array(elements) => each = elements.clone(),
                other => {
                    return Err(ParseError::OperandShape {
                        operator: operator.to_string(),
                        detail: format!(
                            "'$each' for path '{}' must be an array, found {}",
                            path,
                            value_type_name(other)
                        ),
                    })
                }
            },
            "$slice" => match clause_value.as_i64() {
                Some(bound) => slice = Some(bound),
                None => {
                    return Err(ParseError::OperandShape {
                        operator: operator.to_string(),
                        detail: format!(
                            "'$slice' for path '{}' must be an integer, found {}",
                            path,
                            value_type_name(clause_value)
                        ),
                    })
                }
            },
            other => {
                return Err(ParseError::OperandShape {
                    operator: operator.to_string(),
                    detail: format!("unsupported clause '{}' for path '{}'", other, path),
                })
            }
        }
    }

    Ok(Operand::Window { each, slice })
}

/// Reject duplicate or prefix-overlapping target paths
///
/// Quadratic over the operation count; specifications are small and the
/// check runs once per parse.
fn enforce_path_distinctness(ops: &[ModifierOp]) -> Result<(), ParseError> {
    for (i, earlier) in ops.iter().enumerate() {
        for later in &ops[i + 1..] {
            if earlier.path.is_related_to(&later.path) {
                return Err(ParseError::ConflictingPaths {
                    first: earlier.path.to_string(),
                    second: later.path.to_string(),
                });
            }
        }
    }
    Ok(())
}
