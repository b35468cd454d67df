//! Command module for the `structeq` CLI.
//!
//! Each submodule implements one subcommand. Inputs arrive already read and
//! parsed; `run` writes results to stdout and returns `Ok(())` or a
//! [`crate::error::CliError`] carrying the exit code.
pub mod compare;
pub mod hash;

use structeq_core::{JsonShape, Value};

use crate::error::CliError;

/// Parses `content` as JSON and converts it to a comparable value.
pub fn parse_document(content: &str, source: &str, shape: JsonShape) -> Result<Value, CliError> {
    let json: serde_json::Value =
        serde_json::from_str(content).map_err(|e| CliError::ParseFailed {
            source: source.to_owned(),
            detail: e.to_string(),
        })?;
    Ok(Value::from_json_with(&json, shape))
}
