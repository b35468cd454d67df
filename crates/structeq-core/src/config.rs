//! Engine configuration and per-call comparison options.
//!
//! [`DeepEqualsConfig`] carries the settings that apply to every comparison
//! an engine instance performs (tolerance, resource limits, diagnostic
//! rendering). [`CompareOptions`] carries the settings a caller picks per
//! call (custom-equivalence suppression, string/number cross-matching).
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::numeric::DEFAULT_EPSILON;

// ---------------------------------------------------------------------------
// DeepEqualsConfig
// ---------------------------------------------------------------------------

/// Configuration held by a [`crate::DeepEquals`] engine instance.
///
/// Every limit defaults to `None` (unlimited), so the default configuration
/// never aborts a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepEqualsConfig {
    /// Relative tolerance for floating-point comparison.
    ///
    /// Default: `1e-15`.
    pub epsilon: f64,

    /// Redact sensitive member values, secret-looking text and URI query
    /// strings in rendered diagnostics.
    ///
    /// Default: `false`.
    pub secure_errors: bool,

    /// Maximum element count of a list or set.
    pub max_collection_size: Option<usize>,

    /// Maximum length of an array.
    pub max_array_size: Option<usize>,

    /// Maximum entry count of a map.
    pub max_map_size: Option<usize>,

    /// Maximum number of readable members on a record.
    pub max_record_fields: Option<usize>,

    /// Maximum traversal depth; the root pair is at depth 0.
    pub max_depth: Option<usize>,

    /// Number of container elements shown when formatting a value.
    ///
    /// Default: 5.
    pub max_display_elements: usize,

    /// Number of characters of text shown before truncation.
    ///
    /// Default: 100.
    pub max_display_text: usize,
}

impl Default for DeepEqualsConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            secure_errors: false,
            max_collection_size: None,
            max_array_size: None,
            max_map_size: None,
            max_record_fields: None,
            max_depth: None,
            max_display_elements: 5,
            max_display_text: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// CompareOptions
// ---------------------------------------------------------------------------

/// Which record types may use their registered custom equivalence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CustomEquivalence {
    /// Honour every registered custom equivalence.
    #[default]
    UseAll,
    /// Ignore all custom equivalences; always compare member-by-member.
    IgnoreAll,
    /// Ignore the custom equivalence of the listed type names only.
    Ignore(HashSet<String>),
}

impl CustomEquivalence {
    /// Builds the policy from an optional ignore set: `None` uses all custom
    /// rules, an empty set ignores all, a non-empty set ignores the listed
    /// types.
    pub fn from_ignore_set(ignore: Option<HashSet<String>>) -> Self {
        match ignore {
            None => Self::UseAll,
            Some(set) if set.is_empty() => Self::IgnoreAll,
            Some(set) => Self::Ignore(set),
        }
    }

    /// Returns `true` when `type_name`'s custom rule must not be applied.
    pub fn suppresses(&self, type_name: &str) -> bool {
        match self {
            Self::UseAll => false,
            Self::IgnoreAll => true,
            Self::Ignore(set) => set.contains(type_name),
        }
    }

    /// Returns a policy that additionally suppresses `type_name`.
    ///
    /// Each call strictly shrinks the set of types whose custom rule can
    /// still fire, which bounds detail-recovery re-invocations.
    pub fn suppressing(&self, type_name: &str) -> Self {
        match self {
            Self::UseAll => Self::Ignore(HashSet::from([type_name.to_owned()])),
            Self::IgnoreAll => Self::IgnoreAll,
            Self::Ignore(set) => {
                let mut set = set.clone();
                set.insert(type_name.to_owned());
                Self::Ignore(set)
            }
        }
    }
}

/// Per-call options for [`crate::DeepEquals::compare`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompareOptions {
    /// Custom-equivalence policy.
    pub custom_equivalence: CustomEquivalence,
    /// Allow a text value to match a number when the text parses to an
    /// equivalent number.
    pub strings_match_numbers: bool,
}

impl CompareOptions {
    /// Options with string/number cross-matching enabled.
    pub fn strings_match_numbers() -> Self {
        Self {
            strings_match_numbers: true,
            ..Self::default()
        }
    }

    /// Options ignoring the given custom-equivalence policy.
    pub fn with_custom_equivalence(mut self, policy: CustomEquivalence) -> Self {
        self.custom_equivalence = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn default_config_is_unlimited() {
        let config = DeepEqualsConfig::default();
        assert!(config.max_depth.is_none());
        assert!(config.max_collection_size.is_none());
        assert!(!config.secure_errors);
        assert!((config.epsilon - 1e-15).abs() < f64::EPSILON);
    }

    #[test]
    fn config_deserializes_with_defaults_for_missing_fields() {
        let config: DeepEqualsConfig =
            serde_json::from_str(r#"{"max_depth": 64, "secure_errors": true}"#).expect("parse");
        assert_eq!(config.max_depth, Some(64));
        assert!(config.secure_errors);
        assert_eq!(config.max_display_elements, 5);
    }

    #[test]
    fn ignore_set_semantics() {
        assert_eq!(
            CustomEquivalence::from_ignore_set(None),
            CustomEquivalence::UseAll
        );
        assert_eq!(
            CustomEquivalence::from_ignore_set(Some(HashSet::new())),
            CustomEquivalence::IgnoreAll
        );
        let listed = CustomEquivalence::from_ignore_set(Some(HashSet::from(["Point".to_owned()])));
        assert!(listed.suppresses("Point"));
        assert!(!listed.suppresses("Line"));
        assert!(CustomEquivalence::IgnoreAll.suppresses("anything"));
    }

    #[test]
    fn suppressing_accumulates() {
        let policy = CustomEquivalence::UseAll
            .suppressing("A")
            .suppressing("B");
        assert!(policy.suppresses("A"));
        assert!(policy.suppresses("B"));
        assert!(!policy.suppresses("C"));
    }
}
