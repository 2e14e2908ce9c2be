//! Shard key pattern and invariant checking
//!
//! A sharded collection assigns documents to partitions by the values
//! at a declared set of field paths. An update must not change the
//! logical value at any of those paths; this module holds the declared
//! pattern and performs the pre-image/post-image comparison.
//!
//! Two distinct notions of "changed" live on purpose in two places:
//! the application engine's sticky flag answers "did any instruction
//! touch a shard-key path" (cheap, conservative), while
//! [`check_shard_keys_unaltered`] answers "does the materialized value
//! differ" (exact, by structural equality). A touched-but-equal write
//! passes the check.

use crate::error::{ParseError, ShardKeyViolation};
use docmut_core::{get_path, value_type_name, FieldRef};
use serde_json::Value;

/// The ordered set of field paths that determine partition assignment
///
/// Built from a pattern document such as `{"s.a": 1, "s.c": 1}`; the
/// per-path values are conventional and ignored. Replaceable between
/// uses of the same driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardKeyPattern {
    paths: Vec<FieldRef>,
}

impl ShardKeyPattern {
    /// The empty pattern (collection is not sharded)
    pub fn empty() -> Self {
        ShardKeyPattern { paths: Vec::new() }
    }

    /// Build a pattern from a pattern document, preserving key order
    pub fn from_pattern_doc(pattern: &Value) -> Result<Self, ParseError> {
        let map = match pattern {
            Value::Object(map) => map,
            other => {
                return Err(ParseError::NotADocument {
                    found: value_type_name(other),
                })
            }
        };

        let mut paths = Vec::with_capacity(map.len());
        for key in map.keys() {
            let path = key.parse().map_err(|source| ParseError::InvalidPath {
                path: key.clone(),
                source,
            })?;
            paths.push(path);
        }
        Ok(ShardKeyPattern { paths })
    }

    /// The declared paths, in declaration order
    pub fn paths(&self) -> &[FieldRef] {
        &self.paths
    }

    /// True if no shard key is declared
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// True if a write at `path` could change the value observed at any
    /// declared shard-key path
    pub fn affects(&self, path: &FieldRef) -> bool {
        self.paths.iter().any(|key| key.is_related_to(path))
    }
}

/// Verify that no declared shard-key value differs between two images
///
/// Reads each pattern path from both documents (an absent path is
/// distinct from a present null) and compares by deep structural
/// equality: object key sets order-insensitive, arrays order-sensitive,
/// scalars by type and value. Fails on the first differing path.
pub fn check_shard_keys_unaltered(
    pattern: &ShardKeyPattern,
    pre_image: &Value,
    post_image: &Value,
) -> Result<(), ShardKeyViolation> {
    for path in pattern.paths() {
        let before = get_path(pre_image, path);
        let after = get_path(post_image, path);
        if before != after {
            return Err(ShardKeyViolation { path: path.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pattern() -> ShardKeyPattern {
        ShardKeyPattern::from_pattern_doc(&json!({"s.a": 1, "s.c": 1})).unwrap()
    }

    #[test]
    fn test_pattern_from_doc_preserves_order() {
        let p = pattern();
        let rendered: Vec<String> = p.paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["s.a", "s.c"]);
    }

    #[test]
    fn test_pattern_from_non_document_rejected() {
        let err = ShardKeyPattern::from_pattern_doc(&json!(["s.a"])).unwrap_err();
        assert_eq!(err, ParseError::NotADocument { found: "array" });
    }

    #[test]
    fn test_pattern_from_bad_path_rejected() {
        let err = ShardKeyPattern::from_pattern_doc(&json!({"s..a": 1})).unwrap_err();
        assert!(matches!(err, ParseError::InvalidPath { .. }));
    }

    #[test]
    fn test_empty_pattern() {
        assert!(ShardKeyPattern::empty().is_empty());
        assert!(!pattern().is_empty());
    }

    #[test]
    fn test_affects_exact_and_nested_and_parent() {
        let p = pattern();
        assert!(p.affects(&"s.a".parse().unwrap()));
        assert!(p.affects(&"s.a.0".parse().unwrap()));
        assert!(p.affects(&"s".parse().unwrap()));
        assert!(!p.affects(&"s.b".parse().unwrap()));
        assert!(!p.affects(&"x".parse().unwrap()));
    }

    #[test]
    fn test_check_passes_on_identical_images() {
        let doc = json!({"s": {"a": [1], "c": [3, 3, 3]}});
        check_shard_keys_unaltered(&pattern(), &doc, &doc).unwrap();
    }

    #[test]
    fn test_check_fails_on_changed_value() {
        let pre = json!({"s": {"a": [1], "c": [3, 3, 3]}});
        let post = json!({"s": {"a": [2], "c": [3, 3, 3]}});
        let err = check_shard_keys_unaltered(&pattern(), &pre, &post).unwrap_err();
        assert_eq!(err.path, "s.a".parse().unwrap());
    }

    #[test]
    fn test_check_fails_on_removed_field() {
        let pre = json!({"s": {"a": [1], "c": [3, 3, 3]}});
        let post = json!({"s": {"c": [3, 3, 3]}});
        let err = check_shard_keys_unaltered(&pattern(), &pre, &post).unwrap_err();
        assert_eq!(err.path, "s.a".parse().unwrap());
    }

    #[test]
    fn test_check_distinguishes_absent_from_null() {
        let pre = json!({"s": {"a": null, "c": [3]}});
        let post = json!({"s": {"c": [3]}});
        let err = check_shard_keys_unaltered(&pattern(), &pre, &post).unwrap_err();
        assert_eq!(err.path, "s.a".parse().unwrap());
    }

    #[test]
    fn test_check_reports_first_violation_in_pattern_order() {
        let pre = json!({"s": {"a": [1], "c": [3]}});
        let post = json!({"s": {"a": [9], "c": [9]}});
        let err = check_shard_keys_unaltered(&pattern(), &pre, &post).unwrap_err();
        assert_eq!(err.path, "s.a".parse().unwrap());
    }

    #[test]
    fn test_check_ignores_unrelated_changes() {
        let pre = json!({"x": [1], "s": {"a": [1], "b": [2], "c": [3]}});
        let post = json!({"x": [7], "s": {"a": [1], "b": "other", "c": [3]}});
        check_shard_keys_unaltered(&pattern(), &pre, &post).unwrap();
    }

    #[test]
    fn test_check_object_key_order_insensitive() {
        let p = ShardKeyPattern::from_pattern_doc(&json!({"s": 1})).unwrap();
        let pre = json!({"s": {"a": [1], "c": [3]}});
        let post = json!({"s": {"c": [3], "a": [1]}});
        check_shard_keys_unaltered(&p, &pre, &post).unwrap();
    }

    #[test]
    fn test_check_empty_pattern_trivially_passes() {
        let pre = json!({"a": 1});
        let post = json!({"a": 2});
        check_shard_keys_unaltered(&ShardKeyPattern::empty(), &pre, &post).unwrap();
    }
}
