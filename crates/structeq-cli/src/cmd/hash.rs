//! Implementation of `structeq hash <file>...`.
//!
//! Prints one line per document: the 64-bit structural hash in hex followed
//! by the source, in the style of `sha256sum`. Documents that compare equal
//! print the same hash; the converse does not hold. In `--format json` mode
//! each line is a JSON object instead (NDJSON).
use std::io::Write;

use structeq_core::{Value, deep_hash};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Hashes each `(source, value)` pair and writes the results to stdout.
pub fn run(documents: &[(String, Value)], format: OutputFormat) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_hashes(&mut out, documents, format).map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })
}

fn write_hashes<W: Write>(
    w: &mut W,
    documents: &[(String, Value)],
    format: OutputFormat,
) -> std::io::Result<()> {
    for (source, value) in documents {
        let hash = format!("{:016x}", deep_hash(value));
        match format {
            OutputFormat::Human => writeln!(w, "{hash}  {source}")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *w, &serde_json::json!({
                    "source": source,
                    "hash": hash,
                }))?;
                writeln!(w)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn render(documents: &[(String, Value)], format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_hashes(&mut buf, documents, format).expect("write");
        String::from_utf8(buf).expect("utf-8")
    }

    #[test]
    fn reordered_sets_print_the_same_hash() {
        let docs = vec![
            (
                "a.json".to_owned(),
                Value::set([Value::int(1), Value::int(2)]),
            ),
            (
                "b.json".to_owned(),
                Value::set([Value::int(2), Value::float(1.0)]),
            ),
        ];
        let text = render(&docs, OutputFormat::Human);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let (hash_a, source_a) = lines[0].split_once("  ").expect("two columns");
        let (hash_b, source_b) = lines[1].split_once("  ").expect("two columns");
        assert_eq!(hash_a.len(), 16);
        assert_eq!(hash_a, hash_b);
        assert_eq!(source_a, "a.json");
        assert_eq!(source_b, "b.json");
    }

    #[test]
    fn json_format_is_one_object_per_line() {
        let docs = vec![("-".to_owned(), Value::list([Value::text("x")]))];
        let text = render(&docs, OutputFormat::Json);
        let line: serde_json::Value = serde_json::from_str(text.trim_end()).expect("json line");
        assert_eq!(line["source"], "-");
        assert_eq!(
            line["hash"],
            format!("{:016x}", deep_hash(&docs[0].1)).as_str()
        );
    }
}
