//! Shape classification for [`Value`]s.
//!
//! Every component of the engine selects its behaviour from the [`Shape`] of
//! the values at hand rather than from their concrete type.
use crate::value::Value;

/// The structural category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `Value::Null`.
    Null,
    /// Any numeric width, including arbitrary-precision decimals.
    Number,
    /// Text, dates, UUIDs, URIs and other naturally ordered scalars.
    Scalar,
    /// Order-significant sequence.
    List,
    /// Unordered collection.
    Set,
    /// Key/value grouping.
    Map,
    /// Fixed-size array with a declared element type.
    Array,
    /// Composite record with named members.
    Record,
}

impl Shape {
    /// Human-readable label for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number => "number",
            Self::Scalar => "scalar",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Array => "array",
            Self::Record => "record",
        }
    }

    /// `List` or `Set`: the shapes that participate in collection-type
    /// mismatch reporting.
    pub fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Set)
    }
}

/// Returns the shape of `value`. Never fails; the value model has no
/// unrecognised shapes, and records are the catch-all composite case.
pub fn classify(value: &Value) -> Shape {
    match value {
        Value::Null => Shape::Null,
        Value::Number(_) => Shape::Number,
        Value::Bool(_)
        | Value::Char(_)
        | Value::Text(_)
        | Value::Date(_)
        | Value::Timestamp(_)
        | Value::Uuid(_)
        | Value::Uri(_) => Shape::Scalar,
        Value::List(_) => Shape::List,
        Value::Set(_) => Shape::Set,
        Value::Map(_) => Shape::Map,
        Value::Array(_) => Shape::Array,
        Value::Record(_) => Shape::Record,
    }
}
