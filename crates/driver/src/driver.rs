//! Update driver
//!
//! `UpdateDriver` ties the pieces together for one logical update
//! statement: parse the specification once, then apply it to each
//! matched document, consulting the shard-key pattern as it goes.
//!
//! Lifecycle: construct with [`Options`], `parse` a specification
//! (re-parsing replaces all prior state), then call `update` once per
//! target document. `refresh_shard_key_pattern` may replace the pattern
//! between statements; it is not synchronized against concurrent
//! `update` calls on the same instance.

use crate::apply::apply_update;
use crate::error::{ApplyError, ParseError, ShardKeyViolation};
use crate::shard_key::{check_shard_keys_unaltered, ShardKeyPattern};
use crate::spec::{parse_spec, ParsedSpec};
use serde_json::Value;
use tracing::debug;

/// Configuration for an update driver
#[derive(Debug, Clone)]
pub struct Options {
    /// The top-level field a Replacement may not change, if any.
    /// Defaults to `_id`.
    pub identity_field: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            identity_field: Some("_id".to_string()),
        }
    }
}

/// The write-path mutation engine for one update statement
///
/// # Examples
///
/// ```
/// use docmut_driver::{Options, UpdateDriver};
/// use serde_json::json;
///
/// let mut driver = UpdateDriver::new(Options::default());
/// driver.parse(&json!({"$set": {"a": 1}})).unwrap();
/// assert_eq!(driver.num_mods(), 1);
/// assert!(!driver.is_doc_replacement());
///
/// let updated = driver.update(None, &json!({"b": 2})).unwrap();
/// assert_eq!(updated, json!({"b": 2, "a": 1}));
/// ```
#[derive(Debug)]
pub struct UpdateDriver {
    options: Options,
    spec: Option<ParsedSpec>,
    shard_keys: ShardKeyPattern,
    mods_affect_shard_keys: bool,
}

impl UpdateDriver {
    /// Create a driver with the given options and no parsed
    /// specification
    pub fn new(options: Options) -> Self {
        Self {
            options,
            spec: None,
            shard_keys: ShardKeyPattern::empty(),
            mods_affect_shard_keys: false,
        }
    }

    /// Parse an update specification, replacing any prior state
    ///
    /// On failure the driver holds no parsed specification; a
    /// subsequent `update` returns [`ApplyError::NoParsedSpec`].
    pub fn parse(&mut self, spec: &Value) -> Result<(), ParseError> {
        self.spec = None;
        self.mods_affect_shard_keys = false;

        let parsed = parse_spec(spec)?;
        debug!(
            target: "docmut::driver",
            num_mods = parsed.num_mods(),
            replacement = parsed.is_doc_replacement(),
            "Update specification parsed"
        );
        self.spec = Some(parsed);
        Ok(())
    }

    /// Number of flattened modifier operations
    ///
    /// Zero before a successful parse and after a Replacement parse.
    pub fn num_mods(&self) -> usize {
        self.spec.as_ref().map_or(0, ParsedSpec::num_mods)
    }

    /// True iff the parsed specification replaces the whole document
    pub fn is_doc_replacement(&self) -> bool {
        self.spec
            .as_ref()
            .is_some_and(ParsedSpec::is_doc_replacement)
    }

    /// Replace the shard-key pattern from a pattern document
    ///
    /// Callers must not run this concurrently with `update` or
    /// `check_shard_keys_unaltered` on the same instance.
    pub fn refresh_shard_key_pattern(&mut self, pattern: &Value) -> Result<(), ParseError> {
        self.shard_keys = ShardKeyPattern::from_pattern_doc(pattern)?;
        Ok(())
    }

    /// Apply the parsed specification to one target document
    ///
    /// `matched_field` binds positional `$` path parts. Returns the
    /// mutated post-image; the target itself is the untouched
    /// pre-image. An error aborts this document only.
    pub fn update(
        &mut self,
        matched_field: Option<&str>,
        target: &Value,
    ) -> Result<Value, ApplyError> {
        let spec = self.spec.as_ref().ok_or(ApplyError::NoParsedSpec)?;
        let outcome = apply_update(
            spec,
            matched_field,
            target,
            &self.shard_keys,
            self.options.identity_field.as_deref(),
        )?;
        self.mods_affect_shard_keys = outcome.mods_affect_shard_keys;
        debug!(
            target: "docmut::driver",
            mods_affect_shard_keys = outcome.mods_affect_shard_keys,
            "Update applied"
        );
        Ok(outcome.document)
    }

    /// Whether the most recent `update` touched any shard-key path
    ///
    /// Conservative: true means the invariant check is warranted, not
    /// that a value changed.
    pub fn mods_affect_shard_keys(&self) -> bool {
        self.mods_affect_shard_keys
    }

    /// Verify the shard-key invariant between two document images
    ///
    /// Independent of [`Self::mods_affect_shard_keys`]; the flag is only
    /// a hint about whether this comparison is worth running.
    pub fn check_shard_keys_unaltered(
        &self,
        pre_image: &Value,
        post_image: &Value,
    ) -> Result<(), ShardKeyViolation> {
        check_shard_keys_unaltered(&self.shard_keys, pre_image, post_image)
    }
}
