//! Rendered diagnostics for each difference category, plus redaction in
//! secure mode.
#![allow(clippy::expect_used)]

use structeq_core::{
    CompareOptions, DeepEquals, DeepEqualsConfig, Difference, ElementType, JsonShape, Mismatch,
    Record, Value,
};

fn mismatch_with(config: DeepEqualsConfig, left: &Value, right: &Value) -> Mismatch {
    DeepEquals::new(config)
        .compare(left, right, &CompareOptions::default())
        .expect("no limits configured")
        .into_mismatch()
        .expect("values differ")
}

fn render(left: &Value, right: &Value) -> String {
    let config = DeepEqualsConfig::default();
    mismatch_with(config.clone(), left, right).render(&config)
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::int).collect()
}

fn person(name: &str, age: i64) -> Value {
    Value::record(
        Record::new("Person")
            .with_field("name", Value::text(name))
            .with_field("age", Value::int(age)),
    )
}

#[test]
fn field_value_mismatch() {
    assert_eq!(
        render(&person("Jim", 27), &person("Jim", 34)),
        "[field value mismatch] ▶ Person {name: \"Jim\", age: 27} ▶ .age\n  Expected: 27\n  Found: 34"
    );
}

#[test]
fn json_objects_as_records_report_the_member() {
    let shape = JsonShape {
        objects_as_records: true,
        arrays_as_sets: false,
    };
    let left = Value::from_json_with(&serde_json::json!({"name": "Jim", "age": 27}), shape);
    let right = Value::from_json_with(&serde_json::json!({"name": "Jim", "age": 34}), shape);
    let config = DeepEqualsConfig::default();
    let mismatch = mismatch_with(config.clone(), &left, &right);
    assert_eq!(mismatch.difference(), Difference::FieldValueMismatch);
    assert!(mismatch.breadcrumb(&config).ends_with(" ▶ .age"));
    assert_eq!(mismatch.details(&config), "  Expected: 27\n  Found: 34");
}

#[test]
fn scalar_root() {
    assert_eq!(
        render(&Value::int(1), &Value::int(2)),
        "[value mismatch] ▶ i64: 1\n  Expected: 1\n  Found: 2"
    );
}

#[test]
fn collection_size_mismatch() {
    assert_eq!(
        render(&Value::list(ints(&[1, 2, 3])), &Value::list(ints(&[1, 2]))),
        "[collection size mismatch] ▶ List(0..2)\n  Expected size: 3\n  Found size: 2"
    );
}

#[test]
fn nested_list_element_mismatch() {
    let left = Value::list([Value::list(ints(&[1, 2])), Value::list(ints(&[3, 4]))]);
    let right = Value::list([Value::list(ints(&[1, 2])), Value::list(ints(&[3, 5]))]);
    assert_eq!(
        render(&left, &right),
        "[collection element mismatch] ▶ List(0..1) ▶ (1) ▶ (1)\n  Expected: 4\n  Found: 5"
    );
}

#[test]
fn missing_set_element() {
    assert_eq!(
        render(&Value::set(ints(&[1, 2, 3])), &Value::set(ints(&[1, 2, 4]))),
        "[missing collection element] ▶ Set(0..2) ▶ (2)\n  Expected: 3\n  Found: (none)"
    );
}

#[test]
fn map_value_mismatch_shows_the_entry() {
    let left = Value::map([(Value::text("a"), Value::int(1))]);
    let right = Value::map([(Value::text("a"), Value::int(2))]);
    assert_eq!(
        render(&left, &right),
        "[map value mismatch] ▶ Map(0..0) ▶ 《\"a\" ⇨ 1》\n  Expected: 1\n  Found: 2"
    );
}

#[test]
fn missing_map_key() {
    let left = Value::map([(Value::text("a"), Value::int(1))]);
    let right = Value::map([(Value::text("b"), Value::int(1))]);
    assert_eq!(
        render(&left, &right),
        "[missing map key] ▶ Map(0..0)\n  Expected: \"a\"\n  Found: (none)"
    );
}

#[test]
fn map_size_mismatch() {
    let left = Value::map([(Value::text("a"), Value::int(1))]);
    let right = Value::map([]);
    assert_eq!(
        render(&left, &right),
        "[map size mismatch] ▶ Map(0..0)\n  Expected size: 1\n  Found size: 0"
    );
}

#[test]
fn array_categories() {
    let i32s = |values: &[i64]| Value::array(ElementType::named("i32"), ints(values));
    assert_eq!(
        render(&i32s(&[1, 2]), &i32s(&[1])),
        "[array length mismatch] ▶ i32[0..1]\n  Expected length: 2\n  Found length: 1"
    );
    assert_eq!(
        render(&i32s(&[1, 2]), &i32s(&[1, 3])),
        "[array element mismatch] ▶ i32[0..1] ▶ [1]\n  Expected: 2\n  Found: 3"
    );

    let matrix = Value::array(ElementType::named("i32").array_of(), [i32s(&[1])]);
    assert_eq!(
        render(&i32s(&[1]), &matrix),
        "[array dimensions mismatch] ▶ i32[0..0]\n  Expected dimensions: 1\n  Found dimensions: 2"
    );

    let longs = Value::array(ElementType::named("i64"), ints(&[1]));
    assert_eq!(
        render(&i32s(&[1]), &longs),
        "[array component type mismatch] ▶ i32[0..0]\n  Expected type: i32[]\n  Found type: i64[]"
    );
}

#[test]
fn record_type_mismatch() {
    let point = Value::record(Record::new("Point").with_field("x", Value::int(1)));
    let vector = Value::record(Record::new("Vector").with_field("x", Value::int(1)));
    assert_eq!(
        render(&point, &vector),
        "[type mismatch] ▶ Point {x: 1}\n  Expected type: Point\n  Found type: Vector"
    );
}

#[test]
fn collection_type_mismatch() {
    let list = Value::list(ints(&[1]));
    let map = Value::map([(Value::int(0), Value::int(1))]);
    assert_eq!(
        render(&list, &map),
        "[collection type mismatch] ▶ List(0..0)\n  Expected type: List\n  Found type: Map"
    );
}

#[test]
fn display_uses_default_config() {
    let mismatch = mismatch_with(
        DeepEqualsConfig::default(),
        &person("Jim", 27),
        &person("Jim", 34),
    );
    assert_eq!(
        mismatch.to_string(),
        mismatch.render(&DeepEqualsConfig::default())
    );
}

// ── Secure mode ──────────────────────────────────────────────────────────────

fn secure() -> DeepEqualsConfig {
    DeepEqualsConfig {
        secure_errors: true,
        ..DeepEqualsConfig::default()
    }
}

fn user(password: &str) -> Value {
    Value::record(
        Record::new("User")
            .with_field("name", Value::text("Jim"))
            .with_field("password", Value::text(password)),
    )
}

#[test]
fn sensitive_members_are_redacted_in_secure_mode() {
    let config = secure();
    let rendered = mismatch_with(config.clone(), &user("hunter2"), &user("hunter3")).render(&config);
    assert_eq!(
        rendered,
        "[field value mismatch] ▶ User {name: \"Jim\", password: [REDACTED]} ▶ .password\n  Expected: [REDACTED]\n  Found: [REDACTED]"
    );
    assert!(!rendered.contains("hunter"));
}

#[test]
fn sensitive_members_are_shown_without_secure_mode() {
    let rendered = render(&user("hunter2"), &user("hunter3"));
    assert!(rendered.contains("Expected: \"hunter2\""));
    assert!(rendered.contains("Found: \"hunter3\""));
}

#[test]
fn values_below_a_sensitive_member_are_redacted() {
    let session = |token: &str| {
        Value::record(Record::new("Session").with_field(
            "credentials",
            Value::map([(Value::text("primary"), Value::text(token))]),
        ))
    };
    let config = secure();
    let rendered = mismatch_with(config.clone(), &session("abc"), &session("xyz")).render(&config);
    assert!(rendered.contains("《\"primary\" ⇨ [REDACTED]》"), "{rendered}");
    assert!(rendered.ends_with("  Expected: [REDACTED]\n  Found: [REDACTED]"));
}

#[test]
fn uri_queries_and_tokens_are_stripped_in_secure_mode() {
    let config = secure();
    let left = Value::list([Value::uri("https://example.com/cb?code=secret-one")]);
    let right = Value::list([Value::uri("https://example.com/other?code=secret-two")]);
    let rendered = mismatch_with(config.clone(), &left, &right).render(&config);
    assert!(rendered.contains("Expected: https://example.com/cb\n"));
    assert!(rendered.ends_with("Found: https://example.com/other"));
    assert!(!rendered.contains("secret"));

    let bearer = Value::list([Value::text("Bearer abc.def.ghi")]);
    let other = Value::list([Value::text("plain")]);
    let rendered = mismatch_with(config.clone(), &bearer, &other).render(&config);
    assert!(rendered.contains("Expected: [REDACTED]"), "{rendered}");
    assert!(rendered.contains("Found: \"plain\""));
}
