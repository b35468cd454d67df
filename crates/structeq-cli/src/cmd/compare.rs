//! Implementation of `structeq compare <left> <right>`.
//!
//! Compares two parsed documents and writes either `equal` or the rendered
//! diagnostic of the first difference to stdout. In `--format json` mode a
//! single JSON object is written instead.
//!
//! Exit codes: 0 = equal, 1 = different, 3 = resource limit exceeded.
use std::io::Write;
use std::time::Instant;

use structeq_core::{CompareOptions, Comparison, DeepEquals, DeepEqualsConfig, Value};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Runs the comparison and writes the result to stdout.
pub fn run(
    left: &Value,
    right: &Value,
    options: &CompareOptions,
    config: DeepEqualsConfig,
    format: OutputFormat,
) -> Result<(), CliError> {
    let engine = DeepEquals::new(config);
    let started = Instant::now();
    let comparison = engine.compare(left, right, options)?;
    debug!(
        equal = comparison.is_equal(),
        elapsed = ?started.elapsed(),
        "comparison finished"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => write_human(&mut out, &comparison, engine.config()),
        OutputFormat::Json => write_json(&mut out, &comparison, engine.config()),
    }
    .map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })?;

    if comparison.is_equal() {
        Ok(())
    } else {
        Err(CliError::Different)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn write_human<W: Write>(
    w: &mut W,
    comparison: &Comparison,
    config: &DeepEqualsConfig,
) -> std::io::Result<()> {
    match comparison.mismatch() {
        None => writeln!(w, "equal"),
        Some(mismatch) => writeln!(w, "{}", mismatch.render(config)),
    }
}

fn write_json<W: Write>(
    w: &mut W,
    comparison: &Comparison,
    config: &DeepEqualsConfig,
) -> std::io::Result<()> {
    let report = match comparison.mismatch() {
        None => serde_json::json!({ "equal": true }),
        Some(mismatch) => serde_json::json!({
            "equal": false,
            "difference": mismatch.difference().description(),
            "depth": mismatch.failing_node().depth(),
            "breadcrumb": mismatch.breadcrumb(config),
            "details": mismatch.details(config),
        }),
    };
    serde_json::to_writer(&mut *w, &report)?;
    writeln!(w)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use structeq_core::Record;

    use super::*;

    fn person(age: i64) -> Value {
        Value::record(
            Record::new("Person")
                .with_field("name", Value::text("Jim"))
                .with_field("age", Value::int(age)),
        )
    }

    fn comparison(left: &Value, right: &Value) -> Comparison {
        DeepEquals::default()
            .compare(left, right, &CompareOptions::default())
            .expect("no limits")
    }

    fn human(comparison: &Comparison) -> String {
        let mut buf = Vec::new();
        write_human(&mut buf, comparison, &DeepEqualsConfig::default()).expect("write");
        String::from_utf8(buf).expect("utf-8")
    }

    fn json(comparison: &Comparison) -> serde_json::Value {
        let mut buf = Vec::new();
        write_json(&mut buf, comparison, &DeepEqualsConfig::default()).expect("write");
        serde_json::from_slice(&buf).expect("valid json")
    }

    #[test]
    fn equal_documents_print_equal() {
        let c = comparison(&person(27), &person(27));
        assert_eq!(human(&c), "equal\n");
        assert_eq!(json(&c), serde_json::json!({ "equal": true }));
    }

    #[test]
    fn human_output_is_the_rendered_diagnostic() {
        let c = comparison(&person(27), &person(34));
        assert_eq!(
            human(&c),
            "[field value mismatch] ▶ Person {name: \"Jim\", age: 27} ▶ .age\n  Expected: 27\n  Found: 34\n"
        );
    }

    #[test]
    fn json_output_carries_the_difference() {
        let report = json(&comparison(&person(27), &person(34)));
        assert_eq!(report["equal"], false);
        assert_eq!(report["difference"], "field value mismatch");
        assert_eq!(report["depth"], 1);
        assert_eq!(report["details"], "  Expected: 27\n  Found: 34");
    }
}
