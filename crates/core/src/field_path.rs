//! Field paths into a document
//!
//! This module defines the path types used to address nested values:
//! - FieldRef: Immutable dotted path into a document (e.g. `s.a.0`)
//! - PathPart: Individual path component (Name, Index, or Positional)
//! - PathParseError: Structured parse failures with positions
//!
//! Update specifications address array elements with numeric dotted
//! segments (`items.0.name`), not bracket syntax, so a purely numeric
//! segment always parses as an array index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for field path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// The path string was empty
    #[error("empty field path")]
    EmptyPath,
    /// An empty segment between dots (e.g. `a..b` or a trailing dot)
    #[error("empty path segment at position {0}")]
    EmptySegment(usize),
}

/// A single part of a field path
///
/// # Examples
///
/// ```
/// use docmut_core::field_path::PathPart;
///
/// let name = PathPart::Name("user".to_string());
/// let idx = PathPart::Index(0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathPart {
    /// Object field name: `user`
    Name(String),
    /// Array index: `0`
    Index(usize),
    /// Positional placeholder `$`, bound to the matched array index at
    /// application time
    Positional,
}

impl fmt::Display for PathPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPart::Name(n) => write!(f, "{}", n),
            PathPart::Index(i) => write!(f, "{}", i),
            PathPart::Positional => write!(f, "$"),
        }
    }
}

/// An immutable dotted path into a document
///
/// A `FieldRef` is an ordered sequence of [`PathPart`]s identifying one
/// nested value. Paths are comparable: two paths are *related* if one is
/// a prefix of the other or they are equal, which is the overlap notion
/// used both for parse-time conflict detection and for shard-key overlap.
///
/// # Path Syntax
///
/// | Syntax | Meaning | Example |
/// |--------|---------|---------|
/// | `key` | Object field | `user` |
/// | `key.key2` | Nested field | `user.name` |
/// | `key.0` | Array element | `scores.0` |
/// | `key.$` | Positional element | `scores.$` |
///
/// # Examples
///
/// ```
/// use docmut_core::field_path::FieldRef;
///
/// let a: FieldRef = "s.a".parse().unwrap();
/// let a0: FieldRef = "s.a.0".parse().unwrap();
/// let b: FieldRef = "s.b".parse().unwrap();
///
/// assert!(a.is_prefix_of(&a0));
/// assert!(a.is_related_to(&a0));
/// assert!(!a.is_related_to(&b));
/// assert_eq!(a0.to_string(), "s.a.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    parts: Vec<PathPart>,
}

impl FieldRef {
    /// Create a path from a vector of parts
    pub fn from_parts(parts: Vec<PathPart>) -> Self {
        FieldRef { parts }
    }

    /// Get the path parts
    pub fn parts(&self) -> &[PathPart] {
        &self.parts
    }

    /// Get the number of parts in the path
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the path has no parts
    ///
    /// A parsed path is never empty; this only arises for manually
    /// constructed part vectors.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Check if this path is a prefix of another (or equal)
    pub fn is_prefix_of(&self, other: &FieldRef) -> bool {
        if self.parts.len() > other.parts.len() {
            return false;
        }
        self.parts
            .iter()
            .zip(other.parts.iter())
            .all(|(a, b)| a == b)
    }

    /// Check if two paths are related
    ///
    /// Two paths are related iff one is a prefix of the other or they are
    /// equal. A write at either of two related paths can change the value
    /// observed at the other.
    pub fn is_related_to(&self, other: &FieldRef) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }

    /// Check if any part is the positional placeholder `$`
    pub fn has_positional(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, PathPart::Positional))
    }

    /// Return a copy with every positional part bound to `matched`
    ///
    /// The matched field is the array index selected by the query layer;
    /// it parses like any path segment, so a numeric match becomes an
    /// index part.
    pub fn bind_positional(&self, matched: &str) -> FieldRef {
        let parts = self
            .parts
            .iter()
            .map(|p| match p {
                PathPart::Positional => parse_part(matched),
                other => other.clone(),
            })
            .collect();
        FieldRef { parts }
    }
}

/// Parse one dotted segment into a part
fn parse_part(segment: &str) -> PathPart {
    if segment == "$" {
        PathPart::Positional
    } else if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        match segment.parse::<usize>() {
            Ok(idx) => PathPart::Index(idx),
            // Digits overflowing usize stay a name; no document has that
            // many elements, so the lookup just misses.
            Err(_) => PathPart::Name(segment.to_string()),
        }
    } else {
        PathPart::Name(segment.to_string())
    }
}

impl FromStr for FieldRef {
    type Err = PathParseError;

    /// Parse a path from a dotted string
    ///
    /// Empty strings and empty segments (leading, trailing, or doubled
    /// dots) are rejected with the offending position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathParseError::EmptyPath);
        }

        let mut parts = Vec::new();
        let mut pos = 0;
        for segment in s.split('.') {
            if segment.is_empty() {
                return Err(PathParseError::EmptySegment(pos));
            }
            parts.push(parse_part(segment));
            pos += segment.len() + 1;
        }

        Ok(FieldRef { parts })
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> FieldRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_single_name() {
        let p = path("a");
        assert_eq!(p.parts(), &[PathPart::Name("a".to_string())]);
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_parse_nested_names() {
        let p = path("user.name");
        assert_eq!(
            p.parts(),
            &[
                PathPart::Name("user".to_string()),
                PathPart::Name("name".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_numeric_segment_is_index() {
        let p = path("s.a.0");
        assert_eq!(
            p.parts(),
            &[
                PathPart::Name("s".to_string()),
                PathPart::Name("a".to_string()),
                PathPart::Index(0),
            ]
        );
    }

    #[test]
    fn test_parse_positional() {
        let p = path("scores.$");
        assert!(p.has_positional());
        assert_eq!(p.parts()[1], PathPart::Positional);
    }

    #[test]
    fn test_parse_empty_path() {
        let err = "".parse::<FieldRef>().unwrap_err();
        assert_eq!(err, PathParseError::EmptyPath);
    }

    #[test]
    fn test_parse_empty_segment() {
        assert_eq!(
            "a..b".parse::<FieldRef>().unwrap_err(),
            PathParseError::EmptySegment(2)
        );
        assert_eq!(
            "a.".parse::<FieldRef>().unwrap_err(),
            PathParseError::EmptySegment(2)
        );
        assert_eq!(
            ".a".parse::<FieldRef>().unwrap_err(),
            PathParseError::EmptySegment(0)
        );
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["a", "user.name", "s.a.0", "items.$.qty"] {
            assert_eq!(path(s).to_string(), s);
        }
    }

    #[test]
    fn test_prefix_relation() {
        assert!(path("s").is_prefix_of(&path("s.a")));
        assert!(path("s.a").is_prefix_of(&path("s.a")));
        assert!(path("s.a").is_prefix_of(&path("s.a.0")));
        assert!(!path("s.a.0").is_prefix_of(&path("s.a")));
        assert!(!path("s.a").is_prefix_of(&path("s.b")));
    }

    #[test]
    fn test_related_is_symmetric() {
        assert!(path("s.a").is_related_to(&path("s.a.0")));
        assert!(path("s.a.0").is_related_to(&path("s.a")));
        assert!(path("s.a").is_related_to(&path("s.a")));
        assert!(!path("s.a").is_related_to(&path("s.b")));
        assert!(!path("x").is_related_to(&path("s.a")));
    }

    #[test]
    fn test_name_and_index_parts_differ() {
        // `a.0` addresses an array element; a field literally named "0"
        // cannot be written from a dotted path, so the parts must not
        // compare equal to a same-spelling name.
        assert_ne!(PathPart::Index(0), PathPart::Name("0".to_string()));
    }

    #[test]
    fn test_bind_positional() {
        let p = path("scores.$");
        let bound = p.bind_positional("2");
        assert_eq!(
            bound.parts(),
            &[PathPart::Name("scores".to_string()), PathPart::Index(2)]
        );
        assert!(!bound.has_positional());
    }

    #[test]
    fn test_bind_positional_no_placeholder_is_identity() {
        let p = path("s.a");
        assert_eq!(p.bind_positional("3"), p);
    }
}
