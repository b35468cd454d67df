//! Typed reasons a comparison node failed.
use std::fmt;

/// Coarse classification controlling how "expected/found" is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifferenceCategory {
    /// Render both values.
    Value,
    /// Render both type names.
    Type,
    /// Render both element/entry counts.
    Size,
    /// Render both array lengths.
    Length,
    /// Render both array dimension counts.
    Dimension,
}

/// Why a comparison node failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difference {
    /// Two scalars (or a value and null) differ.
    ValueMismatch,
    /// A record member value differs.
    FieldValueMismatch,
    /// Lists or sets have different element counts.
    CollectionSizeMismatch,
    /// A set element on the left has no equivalent on the right.
    CollectionMissingElement,
    /// One side is a list or set and the other is not the same kind.
    CollectionTypeMismatch,
    /// A list or set element differs.
    CollectionElementMismatch,
    /// Maps have different entry counts.
    MapSizeMismatch,
    /// A key on the left has no equivalent key on the right.
    MapMissingKey,
    /// The values stored under equivalent keys differ.
    MapValueMismatch,
    /// Arrays have different dimension counts.
    ArrayDimensionMismatch,
    /// Arrays declare different element types.
    ArrayComponentTypeMismatch,
    /// Arrays have different lengths.
    ArrayLengthMismatch,
    /// An array element differs.
    ArrayElementMismatch,
    /// The two values have incompatible shapes or concrete types.
    TypeMismatch,
}

impl Difference {
    /// Rendering category.
    pub fn category(self) -> DifferenceCategory {
        match self {
            Self::ValueMismatch
            | Self::FieldValueMismatch
            | Self::CollectionMissingElement
            | Self::CollectionElementMismatch
            | Self::MapMissingKey
            | Self::MapValueMismatch
            | Self::ArrayElementMismatch => DifferenceCategory::Value,
            Self::CollectionTypeMismatch
            | Self::ArrayComponentTypeMismatch
            | Self::TypeMismatch => DifferenceCategory::Type,
            Self::CollectionSizeMismatch | Self::MapSizeMismatch => DifferenceCategory::Size,
            Self::ArrayLengthMismatch => DifferenceCategory::Length,
            Self::ArrayDimensionMismatch => DifferenceCategory::Dimension,
        }
    }

    /// Human-readable description used in the diagnostic header.
    pub fn description(self) -> &'static str {
        match self {
            Self::ValueMismatch => "value mismatch",
            Self::FieldValueMismatch => "field value mismatch",
            Self::CollectionSizeMismatch => "collection size mismatch",
            Self::CollectionMissingElement => "missing collection element",
            Self::CollectionTypeMismatch => "collection type mismatch",
            Self::CollectionElementMismatch => "collection element mismatch",
            Self::MapSizeMismatch => "map size mismatch",
            Self::MapMissingKey => "missing map key",
            Self::MapValueMismatch => "map value mismatch",
            Self::ArrayDimensionMismatch => "array dimensions mismatch",
            Self::ArrayComponentTypeMismatch => "array component type mismatch",
            Self::ArrayLengthMismatch => "array length mismatch",
            Self::ArrayElementMismatch => "array element mismatch",
            Self::TypeMismatch => "type mismatch",
        }
    }

    /// Whether the difference reports an absent counterpart rather than two
    /// differing values.
    pub fn is_missing(self) -> bool {
        matches!(self, Self::CollectionMissingElement | Self::MapMissingKey)
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            Difference::CollectionSizeMismatch.category(),
            DifferenceCategory::Size
        );
        assert_eq!(Difference::MapSizeMismatch.category(), DifferenceCategory::Size);
        assert_eq!(
            Difference::ArrayLengthMismatch.category(),
            DifferenceCategory::Length
        );
        assert_eq!(
            Difference::ArrayDimensionMismatch.category(),
            DifferenceCategory::Dimension
        );
        assert_eq!(
            Difference::CollectionTypeMismatch.category(),
            DifferenceCategory::Type
        );
        assert_eq!(
            Difference::FieldValueMismatch.category(),
            DifferenceCategory::Value
        );
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(Difference::MapMissingKey.to_string(), "missing map key");
        assert!(Difference::MapMissingKey.is_missing());
        assert!(!Difference::ValueMismatch.is_missing());
    }
}
