//! Diagnostics formatting for a [`Mismatch`].
//!
//! A rendered diagnostic is a breadcrumb line followed by an expected/found
//! block:
//!
//! ```text
//! [field value mismatch] ▶ Person {name: "Jim", age: 27} ▶ .age
//!   Expected: 27
//!   Found: 34
//! ```
//!
//! The breadcrumb starts with the reported difference, then the root value
//! (containers as a compact range marker, scalars as `Type: value`, records
//! as a one-line member snapshot), then one hop per node on the path:
//! `.member`, `[i]` for arrays, `(i)` for lists and sets, and
//! `《key ⇨ value》` for map entries.
//!
//! Values are truncated to `max_display_elements` elements and
//! `max_display_text` characters. With `secure_errors` enabled, members with
//! credential-like names and token-like text render as `[REDACTED]` and URIs
//! lose their query string.
pub mod redact;

use std::collections::HashSet;

use crate::compare::{Access, ComparisonNode, Mismatch};
use crate::config::DeepEqualsConfig;
use crate::difference::DifferenceCategory;
use crate::value::{ArrayValue, Record, Value};

use redact::{REDACTED, is_sensitive_name, is_sensitive_text, strip_uri_query};

/// Nesting beyond this renders as a range marker.
const MAX_FORMAT_NESTING: usize = 4;

const HOP: &str = " ▶ ";

/// Renders the breadcrumb line.
pub fn breadcrumb(mismatch: &Mismatch, config: &DeepEqualsConfig) -> String {
    let mut out = format!("[{}]", mismatch.difference());
    let path = mismatch.path();
    let mut formatter = ValueFormatter::new(config);

    if let Some(root) = path.first() {
        out.push_str(HOP);
        out.push_str(&formatter.root(root.left()));
    }

    let mut redacting = false;
    for node in path.iter().skip(1) {
        let Some(access) = node.access() else {
            continue;
        };
        out.push_str(HOP);
        match access {
            Access::Field(name) => {
                redacting |= config.secure_errors && is_sensitive_name(name);
                out.push_str(&format!(".{name}"));
            }
            Access::Element(i) => {
                out.push_str(&format!("({i})"));
            }
            Access::ArrayIndex(i) => {
                out.push_str(&format!("[{i}]"));
            }
            Access::MapKey(key) => {
                let key_text = formatter.compact(key);
                let value_text = if redacting {
                    REDACTED.to_owned()
                } else {
                    formatter.compact(node.left())
                };
                out.push_str(&format!("《{key_text} ⇨ {value_text}》"));
            }
        }
    }
    out
}

/// Renders the expected/found block, one line per side, indented by two
/// spaces.
pub fn details(mismatch: &Mismatch, config: &DeepEqualsConfig) -> String {
    let difference = mismatch.difference();
    let reporting = mismatch.reporting_node();
    let leaf = mismatch.failing_node();

    let (label, expected, found) = match difference.category() {
        DifferenceCategory::Size => (
            "size",
            count(reporting.left()),
            count(reporting.right()),
        ),
        DifferenceCategory::Length => (
            "length",
            count(reporting.left()),
            count(reporting.right()),
        ),
        DifferenceCategory::Dimension => (
            "dimensions",
            dimensions(reporting.left()),
            dimensions(reporting.right()),
        ),
        DifferenceCategory::Type => (
            "type",
            reporting.left().type_name(),
            reporting.right().type_name(),
        ),
        DifferenceCategory::Value => {
            let redact = config.secure_errors && on_sensitive_path(mismatch);
            let mut formatter = ValueFormatter::new(config);
            let mut show = |value: &Value| {
                if redact {
                    REDACTED.to_owned()
                } else {
                    formatter.format(value)
                }
            };
            let expected = show(leaf.left());
            let found = if difference.is_missing() {
                "(none)".to_owned()
            } else {
                show(leaf.right())
            };
            return format!("  Expected: {expected}\n  Found: {found}");
        }
    };
    format!("  Expected {label}: {expected}\n  Found {label}: {found}")
}

/// Breadcrumb and details, newline-separated.
pub fn render(mismatch: &Mismatch, config: &DeepEqualsConfig) -> String {
    format!(
        "{}\n{}",
        breadcrumb(mismatch, config),
        details(mismatch, config)
    )
}

/// Whether any member on the path to the failure has a sensitive name.
fn on_sensitive_path(mismatch: &Mismatch) -> bool {
    mismatch
        .path()
        .into_iter()
        .filter_map(ComparisonNode::access)
        .any(|access| matches!(access, Access::Field(name) if is_sensitive_name(name)))
}

fn count(value: &Value) -> String {
    value
        .len()
        .map_or_else(|| "?".to_owned(), |n| n.to_string())
}

fn dimensions(value: &Value) -> String {
    match value {
        Value::Array(array) => array.borrow().dimensions().to_string(),
        Value::Null
        | Value::Bool(_)
        | Value::Char(_)
        | Value::Text(_)
        | Value::Date(_)
        | Value::Timestamp(_)
        | Value::Uuid(_)
        | Value::Uri(_)
        | Value::Number(_)
        | Value::List(_)
        | Value::Set(_)
        | Value::Map(_)
        | Value::Record(_) => "0".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Value formatter
// ---------------------------------------------------------------------------

/// Cycle-safe, truncating value renderer.
///
/// Containers currently being rendered are tracked by identity; meeting one
/// again renders `<cycle: Type>` instead of descending.
pub struct ValueFormatter<'c> {
    config: &'c DeepEqualsConfig,
    in_progress: HashSet<usize>,
}

impl<'c> ValueFormatter<'c> {
    /// A formatter applying the display limits and redaction of `config`.
    pub fn new(config: &'c DeepEqualsConfig) -> Self {
        Self {
            config,
            in_progress: HashSet::new(),
        }
    }

    /// Full rendering, nested up to a fixed depth.
    pub fn format(&mut self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, MAX_FORMAT_NESTING);
        out
    }

    /// Single-level rendering: nested containers and records collapse to
    /// markers.
    pub fn compact(&mut self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, 1);
        out
    }

    /// Breadcrumb root: range marker for containers, `Type: value` for
    /// scalars, member snapshot for records.
    pub fn root(&mut self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_owned(),
            Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Array(_) => marker(value),
            Value::Record(_) => self.compact(value),
            Value::Bool(_)
            | Value::Char(_)
            | Value::Text(_)
            | Value::Date(_)
            | Value::Timestamp(_)
            | Value::Uuid(_)
            | Value::Uri(_)
            | Value::Number(_) => format!("{}: {}", value.type_name(), self.compact(value)),
        }
    }

    fn write_value(&mut self, out: &mut String, value: &Value, budget: usize) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(b) => {
                out.push_str(&b.to_string());
            }
            Value::Char(c) => {
                out.push_str(&format!("'{c}'"));
            }
            Value::Text(text) => self.write_text(out, text),
            Value::Date(d) => {
                out.push_str(&d.to_string());
            }
            Value::Timestamp(t) => out.push_str(&t.to_rfc3339()),
            Value::Uuid(u) => {
                out.push_str(&u.to_string());
            }
            Value::Uri(uri) => {
                if self.config.secure_errors {
                    out.push_str(strip_uri_query(uri));
                } else {
                    out.push_str(uri);
                }
            }
            Value::Number(n) => {
                out.push_str(&n.to_string());
            }
            Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Array(_) | Value::Record(_) => {
                self.write_composite(out, value, budget);
            }
        }
    }

    fn write_composite(&mut self, out: &mut String, value: &Value, budget: usize) {
        if budget == 0 {
            out.push_str(&marker(value));
            return;
        }
        let identity = value.identity().unwrap_or(0);
        if !self.in_progress.insert(identity) {
            out.push_str(&format!("<cycle: {}>", value.type_name()));
            return;
        }
        match value {
            Value::List(items) => {
                out.push('[');
                self.write_elements(out, &items.borrow(), budget - 1);
                out.push(']');
            }
            Value::Set(items) => {
                out.push('{');
                self.write_elements(out, &items.borrow(), budget - 1);
                out.push('}');
            }
            Value::Map(entries) => self.write_entries(out, &entries.borrow(), budget - 1),
            Value::Array(array) => self.write_array(out, &array.borrow(), budget - 1),
            Value::Record(record) => self.write_record(out, &record.borrow(), budget - 1),
            Value::Null
            | Value::Bool(_)
            | Value::Char(_)
            | Value::Text(_)
            | Value::Date(_)
            | Value::Timestamp(_)
            | Value::Uuid(_)
            | Value::Uri(_)
            | Value::Number(_) => self.write_value(out, value, budget),
        }
        self.in_progress.remove(&identity);
    }

    fn write_text(&self, out: &mut String, text: &str) {
        if self.config.secure_errors && is_sensitive_text(text) {
            out.push_str(REDACTED);
            return;
        }
        let limit = self.config.max_display_text;
        out.push('"');
        if text.chars().count() > limit {
            out.extend(text.chars().take(limit));
            out.push('…');
        } else {
            out.push_str(text);
        }
        out.push('"');
    }

    fn write_elements(&mut self, out: &mut String, items: &[Value], budget: usize) {
        let shown = self.config.max_display_elements;
        for (i, item) in items.iter().take(shown).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_value(out, item, budget);
        }
        self.write_remainder(out, items.len());
    }

    fn write_entries(&mut self, out: &mut String, entries: &[(Value, Value)], budget: usize) {
        let shown = self.config.max_display_elements;
        out.push('{');
        for (i, (key, value)) in entries.iter().take(shown).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_value(out, key, budget);
            out.push_str(": ");
            let sensitive_key = key.as_str().is_some_and(is_sensitive_name);
            if self.config.secure_errors && sensitive_key {
                out.push_str(REDACTED);
            } else {
                self.write_value(out, value, budget);
            }
        }
        self.write_remainder(out, entries.len());
        out.push('}');
    }

    fn write_array(&mut self, out: &mut String, array: &ArrayValue, budget: usize) {
        out.push_str(&format!("{}[", array.element_type));
        self.write_elements(out, &array.elements, budget);
        out.push(']');
    }

    fn write_record(&mut self, out: &mut String, record: &Record, budget: usize) {
        out.push_str(&format!("{} {{", record.type_name));
        let visible = record.fields.iter().filter(|f| !f.synthetic);
        let shown = self.config.max_display_elements;
        let mut total = 0;
        for field in visible {
            if total < shown {
                if total > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format!("{}: ", field.name));
                if self.config.secure_errors && is_sensitive_name(&field.name) {
                    out.push_str(REDACTED);
                } else {
                    self.write_value(out, &field.value, budget);
                }
            }
            total += 1;
        }
        self.write_remainder(out, total);
        out.push('}');
    }

    fn write_remainder(&self, out: &mut String, total: usize) {
        let shown = self.config.max_display_elements;
        if total > shown {
            out.push_str(&format!(", …(+{} more)", total - shown));
        }
    }
}

/// Compact size marker: `List(0..2)`, `Map(∅)`, `i32[0..4]`, `Person {..}`.
fn marker(value: &Value) -> String {
    let range = match value.len() {
        Some(0) | None => "∅".to_owned(),
        Some(n) => format!("0..{}", n - 1),
    };
    match value {
        Value::Array(array) => format!("{}[{range}]", array.borrow().element_type),
        Value::Record(record) => format!("{} {{..}}", record.borrow().type_name),
        Value::List(_) | Value::Set(_) | Value::Map(_) => {
            format!("{}({range})", value.type_name())
        }
        Value::Null
        | Value::Bool(_)
        | Value::Char(_)
        | Value::Text(_)
        | Value::Date(_)
        | Value::Timestamp(_)
        | Value::Uuid(_)
        | Value::Uri(_)
        | Value::Number(_) => value.type_name(),
    }
}
