//! Errors that abort a comparison.
//!
//! Logical inequality is never an error; it is reported through
//! [`crate::Comparison`]. A [`CompareError`] means the inputs could not be
//! evaluated safely within the configured resource limits.
use std::fmt;

/// The resource limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// Traversal depth.
    Depth,
    /// List or set element count.
    CollectionSize,
    /// Array length.
    ArraySize,
    /// Map entry count.
    MapSize,
    /// Record member count.
    RecordFields,
}

impl LimitKind {
    /// Configuration key name of the limit.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Depth => "max_depth",
            Self::CollectionSize => "max_collection_size",
            Self::ArraySize => "max_array_size",
            Self::MapSize => "max_map_size",
            Self::RecordFields => "max_record_fields",
        }
    }
}

/// Fatal comparison failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    /// An input exceeded a configured resource limit.
    LimitExceeded {
        /// Which limit.
        kind: LimitKind,
        /// The configured maximum.
        limit: usize,
        /// The observed size or depth.
        actual: usize,
    },
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitExceeded {
                kind,
                limit,
                actual,
            } => write!(
                f,
                "resource limit exceeded: {} is {limit}, input reached {actual}",
                kind.as_str()
            ),
        }
    }
}

impl std::error::Error for CompareError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_limit() {
        let err = CompareError::LimitExceeded {
            kind: LimitKind::Depth,
            limit: 10,
            actual: 11,
        };
        assert_eq!(
            err.to_string(),
            "resource limit exceeded: max_depth is 10, input reached 11"
        );
    }
}
