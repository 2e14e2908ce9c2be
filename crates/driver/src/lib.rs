//! Update driver for docmut
//!
//! This crate implements the write-path mutation engine:
//! - Operator registry: the closed set of modifier operators
//! - Specification parser: Replacement vs ordered modifier operations
//! - Application engine: ordered, auto-vivifying mutation of one
//!   target document per call
//! - Shard-key pattern and invariant checker
//! - UpdateDriver: the per-statement facade over all of the above
//!
//! Everything is synchronous, single-threaded computation over owned
//! values; persistence, query matching, and wire decoding are the
//! caller's collaborators, not this crate's concern.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apply;
pub mod driver;
pub mod error;
pub mod registry;
pub mod shard_key;
pub mod spec;

// Re-export commonly used types
pub use apply::{apply_update, ApplyOutcome};
pub use driver::{Options, UpdateDriver};
pub use error::{ApplyError, ParseError, ShardKeyViolation};
pub use registry::{OpKind, OperatorDescriptor, OPERATOR_SIGIL};
pub use shard_key::{check_shard_keys_unaltered, ShardKeyPattern};
pub use spec::{parse_spec, ModifierOp, Operand, ParsedSpec};
