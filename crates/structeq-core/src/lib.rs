#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod compare;
pub mod config;
pub mod difference;
pub mod error;
pub mod format;
pub mod hash;
pub mod introspect;
mod limits;
pub mod numeric;
pub mod shape;
pub mod value;

pub use compare::{
    Access, Comparison, ComparisonNode, DeepEquals, Mismatch, NodeId, deep_equals,
    deep_equals_with,
};
pub use config::{CompareOptions, CustomEquivalence, DeepEqualsConfig};
pub use difference::{Difference, DifferenceCategory};
pub use error::{CompareError, LimitKind};
pub use format::ValueFormatter;
pub use hash::{deep_hash, deep_hash_with};
pub use introspect::{
    CustomEquivalenceFn, CustomHashFn, Introspector, Member, ReadError, TypeRegistry,
};
pub use numeric::{DEFAULT_EPSILON, nearly_equal, numbers_equal};
pub use shape::{Shape, classify};
pub use value::{ArrayValue, ElementType, Field, JsonShape, Number, Record, Shared, Value};

/// Returns the current version of the structeq-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }
}
