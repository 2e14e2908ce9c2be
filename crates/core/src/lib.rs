//! Core value types for docmut
//!
//! This crate defines the foundational types used by the update engine:
//! - FieldRef: Immutable dotted field path (`s.a.0`)
//! - PathPart: Individual path component (Name, Index, Positional)
//! - Document tree operations: get_path, set_path, unset_path,
//!   get_or_insert_array (auto-vivifying write path)
//! - PathParseError / DocumentError: structured failures
//!
//! Everything here is pure computation over owned values: no I/O, no
//! shared state, no mutation policy. Which paths may be written, and in
//! what order, is the driver crate's concern.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod field_path;

// Re-export commonly used types
pub use document::{
    get_or_insert_array, get_path, set_path, unset_path, value_type_name, DocumentError,
};
pub use field_path::{FieldRef, PathParseError, PathPart};
