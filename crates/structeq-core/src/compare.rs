//! Deep structural comparison.
//!
//! [`DeepEquals`] decides whether two [`Value`] graphs are structurally
//! equivalent and, when they are not, retains the first point of divergence
//! as a [`Mismatch`] that can be rendered into a diagnostic.
//!
//! # Algorithm
//!
//! Comparison is an explicit work-stack machine, never native recursion over
//! the value graph:
//!
//! 1. The root pair is pushed as a [`ComparisonNode`].
//! 2. The head of the stack is peeked. A node seen for the second time is
//!    retired; otherwise it is evaluated: scalars resolve in place,
//!    containers and records push one child node per sub-comparison.
//! 3. Container and record pairs are recorded by identity. Meeting a pair
//!    again (a cycle) counts as "equal so far".
//! 4. The first failure stops the machine and the node chain leading to it
//!    becomes the [`Mismatch`].
//!
//! Sets and map keys are matched by full comparison of candidates drawn from
//! deep-hash buckets. Each candidate probe runs in a frame of its own, pushed
//! above the frame that is waiting for the answer; one loop drives all
//! frames, so nested unordered containers never deepen the native stack.
//! The only native recursion left is the detail-recovery re-run after a
//! custom equivalence fails, which suppresses one type per level.
mod engine;
mod node;
mod strategies;


use std::fmt;

use crate::config::{CompareOptions, DeepEqualsConfig};
use crate::error::CompareError;
use crate::hash::deep_hash_with;
use crate::introspect::{Introspector, TypeRegistry};
use crate::value::Value;

use engine::{Engine, Outcome};

pub use node::{Access, ComparisonNode, Mismatch, NodeId};

/// Result of a completed comparison.
#[derive(Debug, Clone)]
pub struct Comparison {
    mismatch: Option<Mismatch>,
}

impl Comparison {
    /// `true` when the two values are structurally equivalent.
    pub fn is_equal(&self) -> bool {
        self.mismatch.is_none()
    }

    /// The first divergence, when the values differ.
    pub fn mismatch(&self) -> Option<&Mismatch> {
        self.mismatch.as_ref()
    }

    /// Consumes the comparison, returning the divergence if any.
    pub fn into_mismatch(self) -> Option<Mismatch> {
        self.mismatch
    }
}

/// A configured comparison engine.
///
/// Holds the [`DeepEqualsConfig`] and the [`Introspector`] used for records.
/// All per-call state lives on the stack of [`DeepEquals::compare`], so one
/// instance can serve any number of comparisons.
pub struct DeepEquals {
    config: DeepEqualsConfig,
    introspector: Box<dyn Introspector>,
}

impl DeepEquals {
    /// An engine with the given configuration and no custom type rules.
    pub fn new(config: DeepEqualsConfig) -> Self {
        Self {
            config,
            introspector: Box::new(TypeRegistry::new()),
        }
    }

    /// Replaces the record introspector.
    pub fn with_introspector(mut self, introspector: impl Introspector + 'static) -> Self {
        self.introspector = Box::new(introspector);
        self
    }

    /// The engine configuration.
    pub fn config(&self) -> &DeepEqualsConfig {
        &self.config
    }

    /// Compares `left` (expected) with `right` (found).
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::LimitExceeded`] when either input exceeds a
    /// configured resource limit. Inequality is not an error.
    pub fn compare(
        &self,
        left: &Value,
        right: &Value,
        options: &CompareOptions,
    ) -> Result<Comparison, CompareError> {
        let engine = Engine::new(&self.config, self.introspector.as_ref());
        let mismatch = match engine.compare(left, right, options)? {
            Outcome::Equal => None,
            Outcome::Unequal(mismatch) => Some(mismatch),
        };
        Ok(Comparison { mismatch })
    }

    /// Shorthand for `compare(..)?.is_equal()`.
    ///
    /// # Errors
    ///
    /// Same as [`DeepEquals::compare`].
    pub fn equals(
        &self,
        left: &Value,
        right: &Value,
        options: &CompareOptions,
    ) -> Result<bool, CompareError> {
        self.compare(left, right, options)
            .map(|comparison| comparison.is_equal())
    }

    /// Deep hash of `value` using this engine's custom hash rules.
    pub fn hash(&self, value: &Value) -> u64 {
        deep_hash_with(value, self.introspector.as_ref())
    }
}

impl Default for DeepEquals {
    fn default() -> Self {
        Self::new(DeepEqualsConfig::default())
    }
}

impl fmt::Debug for DeepEquals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepEquals")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Structural equality with default configuration and options.
///
/// The default configuration has no resource limits, so this never fails.
pub fn deep_equals(left: &Value, right: &Value) -> bool {
    deep_equals_with(left, right, &CompareOptions::default())
}

/// Structural equality with default configuration and the given options.
pub fn deep_equals_with(left: &Value, right: &Value, options: &CompareOptions) -> bool {
    DeepEquals::default()
        .equals(left, right, options)
        .unwrap_or(false)
}
