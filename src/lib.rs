//! docmut - Write-path document mutation engine
//!
//! docmut is the update engine of an embedded document store: it parses
//! a declarative update specification, classifies it as a whole-document
//! replacement or an ordered set of field-level modifier operations,
//! applies it to a target document, and verifies that a declared
//! shard-key pattern was not logically changed by the mutation.
//!
//! # Quick Start
//!
//! ```
//! use docmut::{Options, UpdateDriver};
//! use serde_json::json;
//!
//! let mut driver = UpdateDriver::new(Options::default());
//! driver.parse(&json!({"$set": {"user.name": "Alice"}}))?;
//!
//! let doc = json!({"user": {"name": "Bob"}});
//! let updated = driver.update(None, &doc)?;
//! assert_eq!(updated, json!({"user": {"name": "Alice"}}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! Field paths and the mutable document tree live in `docmut-core`; the
//! operator registry, specification parser, application engine, and
//! shard-key checker live in `docmut-driver`. This crate re-exports the
//! public surface of both.

pub use docmut_core::{
    get_or_insert_array, get_path, set_path, unset_path, value_type_name, DocumentError, FieldRef,
    PathParseError, PathPart,
};
pub use docmut_driver::*;
