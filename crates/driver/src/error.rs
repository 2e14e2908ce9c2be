//! Error types for the update driver
//!
//! This module defines the error taxonomy of the mutation engine.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations. Every variant carries the offending operator name,
//! path, or type so callers can build a precise client-facing message;
//! nothing is swallowed internally.

use docmut_core::{FieldRef, PathParseError};
use thiserror::Error;

/// Errors rejecting an update specification at parse time
///
/// A parse error is terminal for that specification: the driver clears
/// any previously parsed state and `update` must not be called until a
/// later `parse` succeeds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The specification was not a document
    #[error("update specification must be a document, found {found}")]
    NotADocument {
        /// Actual type of the specification value
        found: &'static str,
    },

    /// Operator keys and plain replacement keys in one specification
    #[error("cannot mix operator key '{sigil_key}' and plain key '{plain_key}' in one update")]
    MixedMode {
        /// First operator-sigil key seen
        sigil_key: String,
        /// First plain key seen
        plain_key: String,
    },

    /// A top-level key named an operator that is not registered
    #[error("unknown update operator '{name}'")]
    UnknownOperator {
        /// The unrecognized operator name
        name: String,
    },

    /// An operator's operand had the wrong shape
    #[error("wrong operand shape for operator '{operator}': {detail}")]
    OperandShape {
        /// The operator whose operand was malformed
        operator: String,
        /// What was wrong with it
        detail: String,
    },

    /// An operator was present with an empty operand document
    #[error("operator '{operator}' has an empty operand document")]
    EmptyOperator {
        /// The operator with no targets
        operator: String,
    },

    /// A target path string did not parse
    #[error("invalid target path '{path}': {source}")]
    InvalidPath {
        /// The offending path string
        path: String,
        /// The underlying path parse failure
        #[source]
        source: PathParseError,
    },

    /// Two operations target the same or prefix-overlapping paths
    #[error("conflicting target paths '{first}' and '{second}'")]
    ConflictingPaths {
        /// The earlier path in flattened order
        first: String,
        /// The later, conflicting path
        second: String,
    },
}

/// Errors aborting mutation of one target document
///
/// Apply errors are local to the document being updated; in a
/// multi-document update the driver is re-invoked per document and one
/// document's failure does not affect the others.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// `update` called without a successfully parsed specification
    #[error("no parsed update specification; call parse first")]
    NoParsedSpec,

    /// An operation's target path tried to traverse through a leaf
    #[error("cannot traverse path '{path}': expected a container, found {found}")]
    PathConflict {
        /// The operation's target path
        path: String,
        /// The leaf type that blocked traversal
        found: &'static str,
    },

    /// A replacement tried to change the designated identity field
    #[error("field '{field}' is immutable and cannot be changed by a replacement")]
    IdentityFieldImmutable {
        /// The designated identity field
        field: String,
    },

    /// A positional path had no matched field to bind `$` to
    #[error("positional path '{path}' has no matched field to bind to")]
    PositionalUnmatched {
        /// The positional target path
        path: String,
    },
}

/// A mutation changed the logical value of a shard-key field
///
/// Reported for the first differing pattern path; violations are never
/// aggregated and never silently corrected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("shard key field '{path}' cannot be changed by an update")]
pub struct ShardKeyViolation {
    /// The shard-key path whose value differs between images
    pub path: FieldRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_mixed_mode() {
        let err = ParseError::MixedMode {
            sigil_key: "$set".to_string(),
            plain_key: "obj".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("$set"));
        assert!(msg.contains("obj"));
    }

    #[test]
    fn test_parse_error_display_unknown_operator() {
        let err = ParseError::UnknownOperator {
            name: "$xyz".to_string(),
        };
        assert!(err.to_string().contains("$xyz"));
    }

    #[test]
    fn test_parse_error_display_invalid_path() {
        let err = ParseError::InvalidPath {
            path: "a..b".to_string(),
            source: PathParseError::EmptySegment(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("a..b"));
    }

    #[test]
    fn test_apply_error_display_path_conflict() {
        let err = ApplyError::PathConflict {
            path: "a.b".to_string(),
            found: "number",
        };
        let msg = err.to_string();
        assert!(msg.contains("a.b"));
        assert!(msg.contains("number"));
    }

    #[test]
    fn test_shard_key_violation_display() {
        let err = ShardKeyViolation {
            path: "s.a".parse().unwrap(),
        };
        assert!(err.to_string().contains("s.a"));
    }
}
