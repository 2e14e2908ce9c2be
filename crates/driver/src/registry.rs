//! Operator registry
//!
//! A fixed, read-only mapping from operator names (`$set`, `$unset`,
//! ...) to their kind. The closed set of kinds is a tagged enum rather
//! than a trait hierarchy: adding an operator means adding a variant
//! here, one validation arm in the parser, and one application arm in
//! the engine.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The reserved prefix that marks a top-level key as an operator
pub const OPERATOR_SIGIL: char = '$';

/// The closed set of modifier operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Write a value at the target path (`$set`)
    SetValue,
    /// Remove the value at the target path (`$unset`)
    UnsetValue,
    /// Append a fixed list of elements to an array (`$pushAll`)
    AppendAll,
    /// Append elements then truncate to a bounded window (`$push` with
    /// `$each`/`$slice`)
    AppendWithSliceWindow,
    /// Write a value only when the document is being newly created
    /// (`$setOnInsert`)
    SetOnInsertOnly,
}

/// Static description of one registered operator
#[derive(Debug, Clone, Copy)]
pub struct OperatorDescriptor {
    /// The operator's wire name, sigil included
    pub name: &'static str,
    /// Which application rule the operator maps to
    pub kind: OpKind,
}

static REGISTRY: Lazy<HashMap<&'static str, OperatorDescriptor>> = Lazy::new(|| {
    let operators = [
        OperatorDescriptor {
            name: "$set",
            kind: OpKind::SetValue,
        },
        OperatorDescriptor {
            name: "$unset",
            kind: OpKind::UnsetValue,
        },
        OperatorDescriptor {
            name: "$pushAll",
            kind: OpKind::AppendAll,
        },
        OperatorDescriptor {
            name: "$push",
            kind: OpKind::AppendWithSliceWindow,
        },
        OperatorDescriptor {
            name: "$setOnInsert",
            kind: OpKind::SetOnInsertOnly,
        },
    ];
    operators.into_iter().map(|op| (op.name, op)).collect()
});

/// Look up a registered operator by name
pub fn lookup(name: &str) -> Option<&'static OperatorDescriptor> {
    REGISTRY.get(name)
}

/// Check whether a top-level key is operator-shaped
pub fn is_operator_key(key: &str) -> bool {
    key.starts_with(OPERATOR_SIGIL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_registered_operators() {
        assert_eq!(lookup("$set").unwrap().kind, OpKind::SetValue);
        assert_eq!(lookup("$unset").unwrap().kind, OpKind::UnsetValue);
        assert_eq!(lookup("$pushAll").unwrap().kind, OpKind::AppendAll);
        assert_eq!(lookup("$push").unwrap().kind, OpKind::AppendWithSliceWindow);
        assert_eq!(
            lookup("$setOnInsert").unwrap().kind,
            OpKind::SetOnInsertOnly
        );
    }

    #[test]
    fn test_lookup_unknown_operator() {
        assert!(lookup("$xyz").is_none());
        assert!(lookup("set").is_none());
    }

    #[test]
    fn test_is_operator_key() {
        assert!(is_operator_key("$set"));
        assert!(is_operator_key("$anything"));
        assert!(!is_operator_key("set"));
        assert!(!is_operator_key(""));
    }
}
