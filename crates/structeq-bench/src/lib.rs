//! Value-graph generators and benchmark utilities for structeq.
//!
//! This crate provides deterministic generation of nested value graphs for
//! benchmarking and property-based testing of `structeq-core`.

pub mod generator;

pub use generator::{
    GeneratorConfig, SizeTier, generate_shuffled, generate_value, nested_lists,
};
