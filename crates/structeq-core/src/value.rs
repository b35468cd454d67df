//! Dynamic value graph compared by the deep-equality engine.
//!
//! [`Value`] is a cheap-to-clone handle. Scalars are stored inline; containers
//! and records live behind [`Shared`] (`Rc<RefCell<_>>`), which gives them a
//! stable identity (their allocation address) and lets callers build
//! self-referential graphs such as `a.next = a`.
//!
//! The engine only ever borrows shared contents immutably and never holds a
//! borrow across a push onto its work stack, so graphs may be mutated freely
//! between comparisons.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Shared, mutable, identity-carrying storage for containers and records.
pub type Shared<T> = Rc<RefCell<T>>;

/// Numeric payload. Every width is one shape as far as the classifier is
/// concerned; see [`crate::numeric`] for the equivalence rule.
#[derive(Debug, Clone)]
pub enum Number {
    /// Signed 64-bit integer.
    Int(i64),
    /// Unsigned 64-bit integer.
    UInt(u64),
    /// Arbitrary-precision decimal.
    Decimal(BigDecimal),
    /// IEEE 754 single-precision float.
    F32(f32),
    /// IEEE 754 double-precision float.
    F64(f64),
}

impl Number {
    /// Name of the concrete numeric type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "i64",
            Self::UInt(_) => "u64",
            Self::Decimal(_) => "Decimal",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
        }
    }

    /// Returns `true` for the floating-point variants.
    pub fn is_floating(&self) -> bool {
        matches!(self, Self::F32(_) | Self::F64(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
        }
    }
}

/// Declared element type of an [`ArrayValue`].
///
/// Nesting `Array` expresses multi-dimensional arrays: an `i32[][]` has
/// element type `Array(Named("i32"))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// A non-array element type.
    Named(String),
    /// The elements are themselves arrays of the inner type.
    Array(Box<ElementType>),
}

impl ElementType {
    /// Shorthand for [`ElementType::Named`].
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Wraps `self` in one more array level.
    pub fn array_of(self) -> Self {
        Self::Array(Box::new(self))
    }

    /// Number of array levels in the declaration (0 for a named type).
    pub fn nesting(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Self::Array(inner) = current {
            depth += 1;
            current = inner;
        }
        depth
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current = self;
        let mut depth = 0;
        while let Self::Array(inner) = current {
            depth += 1;
            current = inner;
        }
        if let Self::Named(name) = current {
            f.write_str(name)?;
        }
        for _ in 0..depth {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// A fixed-size, integer-indexed grouping with a declared element type.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    /// Declared element type.
    pub element_type: ElementType,
    /// Array elements.
    pub elements: Vec<Value>,
}

impl ArrayValue {
    /// Dimension count: one for the array itself plus the nesting of its
    /// element type.
    pub fn dimensions(&self) -> usize {
        1 + self.element_type.nesting()
    }
}

/// One named member of a [`Record`].
#[derive(Debug, Clone)]
pub struct Field {
    /// Member name.
    pub name: String,
    /// Member value.
    pub value: Value,
    /// Compiler-synthesized members are invisible to introspection.
    pub synthetic: bool,
}

/// A composite value: a concrete type name plus ordered named members.
#[derive(Debug, Clone)]
pub struct Record {
    /// Concrete type of the record. Two records are only comparable
    /// member-by-member when their type names agree.
    pub type_name: String,
    /// Members in declaration order.
    pub fields: Vec<Field>,
}

impl Record {
    /// Creates a record with no members.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a member and returns the record (builder style).
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Appends a compiler-synthesized member.
    pub fn with_synthetic_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value,
            synthetic: true,
        });
        self
    }

    /// Replaces the value of `name`, or appends it if absent.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value;
        } else {
            self.fields.push(Field {
                name,
                value,
                synthetic: false,
            });
        }
    }

    /// Looks up a member value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

/// A dynamic value.
///
/// Dropping the last handle to a container drops its contents recursively,
/// one native frame per nesting level. Tear down very deeply nested values
/// with [`Value::dismantle`] instead.
#[derive(Clone)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Single character scalar.
    Char(char),
    /// UTF-8 text scalar.
    Text(Rc<str>),
    /// Calendar date scalar.
    Date(NaiveDate),
    /// UTC instant scalar.
    Timestamp(DateTime<Utc>),
    /// UUID scalar.
    Uuid(Uuid),
    /// URI scalar, kept as its textual form.
    Uri(Rc<str>),
    /// Any numeric type.
    Number(Number),
    /// Order-significant sequence.
    List(Shared<Vec<Value>>),
    /// Unordered collection; multiplicities matter.
    Set(Shared<Vec<Value>>),
    /// Key/value grouping in insertion order.
    Map(Shared<Vec<(Value, Value)>>),
    /// Fixed-size array with a declared element type.
    Array(Shared<ArrayValue>),
    /// Composite record with named members.
    Record(Shared<Record>),
}

fn shared<T>(inner: T) -> Shared<T> {
    Rc::new(RefCell::new(inner))
}

impl Value {
    /// Text scalar.
    pub fn text(s: impl AsRef<str>) -> Self {
        Self::Text(Rc::from(s.as_ref()))
    }

    /// URI scalar.
    pub fn uri(s: impl AsRef<str>) -> Self {
        Self::Uri(Rc::from(s.as_ref()))
    }

    /// `i64` number.
    pub fn int(n: i64) -> Self {
        Self::Number(Number::Int(n))
    }

    /// `f64` number.
    pub fn float(v: f64) -> Self {
        Self::Number(Number::F64(v))
    }

    /// Arbitrary-precision decimal number.
    pub fn decimal(d: BigDecimal) -> Self {
        Self::Number(Number::Decimal(d))
    }

    /// Ordered list of values.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(shared(items.into_iter().collect()))
    }

    /// Unordered collection of values.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Set(shared(items.into_iter().collect()))
    }

    /// Map from key/value pairs, in the given order.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::Map(shared(entries.into_iter().collect()))
    }

    /// Array with a declared element type.
    pub fn array(element_type: ElementType, items: impl IntoIterator<Item = Value>) -> Self {
        Self::Array(shared(ArrayValue {
            element_type,
            elements: items.into_iter().collect(),
        }))
    }

    /// Wraps a built [`Record`].
    pub fn record(record: Record) -> Self {
        Self::Record(shared(record))
    }

    /// Drops `self` without recursing through nested containers.
    ///
    /// Containers owned only through `self` are emptied one level at a time.
    /// A container still referenced elsewhere is left intact; its last owner
    /// decides how it is dropped. Reference cycles are not broken.
    pub fn dismantle(self) {
        let mut pending = vec![self];
        while let Some(value) = pending.pop() {
            match value {
                Self::List(items) | Self::Set(items) => {
                    if let Some(items) = Rc::into_inner(items) {
                        pending.extend(items.into_inner());
                    }
                }
                Self::Map(entries) => {
                    if let Some(entries) = Rc::into_inner(entries) {
                        for (key, value) in entries.into_inner() {
                            pending.push(key);
                            pending.push(value);
                        }
                    }
                }
                Self::Array(array) => {
                    if let Some(array) = Rc::into_inner(array) {
                        pending.extend(array.into_inner().elements);
                    }
                }
                Self::Record(record) => {
                    if let Some(record) = Rc::into_inner(record) {
                        pending.extend(record.into_inner().fields.into_iter().map(|f| f.value));
                    }
                }
                Self::Null
                | Self::Bool(_)
                | Self::Char(_)
                | Self::Text(_)
                | Self::Date(_)
                | Self::Timestamp(_)
                | Self::Uuid(_)
                | Self::Uri(_)
                | Self::Number(_) => {}
            }
        }
    }

    /// Returns `true` if this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Allocation address of a container or record; `None` for scalars.
    ///
    /// Two handles with the same identity are the same object.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::List(rc) | Self::Set(rc) => Some(Rc::as_ptr(rc).cast::<()>() as usize),
            Self::Map(rc) => Some(Rc::as_ptr(rc).cast::<()>() as usize),
            Self::Array(rc) => Some(Rc::as_ptr(rc).cast::<()>() as usize),
            Self::Record(rc) => Some(Rc::as_ptr(rc).cast::<()>() as usize),
            Self::Null
            | Self::Bool(_)
            | Self::Char(_)
            | Self::Text(_)
            | Self::Date(_)
            | Self::Timestamp(_)
            | Self::Uuid(_)
            | Self::Uri(_)
            | Self::Number(_) => None,
        }
    }

    /// Name of the concrete type, used in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Bool(_) => "bool".to_owned(),
            Self::Char(_) => "char".to_owned(),
            Self::Text(_) => "String".to_owned(),
            Self::Date(_) => "Date".to_owned(),
            Self::Timestamp(_) => "Timestamp".to_owned(),
            Self::Uuid(_) => "Uuid".to_owned(),
            Self::Uri(_) => "Uri".to_owned(),
            Self::Number(n) => n.type_name().to_owned(),
            Self::List(_) => "List".to_owned(),
            Self::Set(_) => "Set".to_owned(),
            Self::Map(_) => "Map".to_owned(),
            Self::Array(a) => format!("{}[]", a.borrow().element_type),
            Self::Record(r) => r.borrow().type_name.clone(),
        }
    }

    /// Element, entry or member count for containers and records.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items.borrow().len()),
            Self::Map(entries) => Some(entries.borrow().len()),
            Self::Array(array) => Some(array.borrow().elements.len()),
            Self::Record(record) => Some(record.borrow().fields.len()),
            Self::Null
            | Self::Bool(_)
            | Self::Char(_)
            | Self::Text(_)
            | Self::Date(_)
            | Self::Timestamp(_)
            | Self::Uuid(_)
            | Self::Uri(_)
            | Self::Number(_) => None,
        }
    }

    /// Returns the text if this is `Value::Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Null
            | Self::Bool(_)
            | Self::Char(_)
            | Self::Date(_)
            | Self::Timestamp(_)
            | Self::Uuid(_)
            | Self::Uri(_)
            | Self::Number(_)
            | Self::List(_)
            | Self::Set(_)
            | Self::Map(_)
            | Self::Array(_)
            | Self::Record(_) => None,
        }
    }

    /// Returns the number if this is `Value::Number`.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            Self::Null
            | Self::Bool(_)
            | Self::Char(_)
            | Self::Text(_)
            | Self::Date(_)
            | Self::Timestamp(_)
            | Self::Uuid(_)
            | Self::Uri(_)
            | Self::List(_)
            | Self::Set(_)
            | Self::Map(_)
            | Self::Array(_)
            | Self::Record(_) => None,
        }
    }

    /// Returns the shared record if this is `Value::Record`.
    pub fn as_record(&self) -> Option<&Shared<Record>> {
        match self {
            Self::Record(r) => Some(r),
            Self::Null
            | Self::Bool(_)
            | Self::Char(_)
            | Self::Text(_)
            | Self::Date(_)
            | Self::Timestamp(_)
            | Self::Uuid(_)
            | Self::Uri(_)
            | Self::Number(_)
            | Self::List(_)
            | Self::Set(_)
            | Self::Map(_)
            | Self::Array(_) => None,
        }
    }

    /// Returns the shared element vector for `List` and `Set`.
    pub fn as_elements(&self) -> Option<&Shared<Vec<Value>>> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            Self::Null
            | Self::Bool(_)
            | Self::Char(_)
            | Self::Text(_)
            | Self::Date(_)
            | Self::Timestamp(_)
            | Self::Uuid(_)
            | Self::Uri(_)
            | Self::Number(_)
            | Self::Map(_)
            | Self::Array(_)
            | Self::Record(_) => None,
        }
    }

    /// Returns the shared entry vector for `Map`.
    pub fn as_entries(&self) -> Option<&Shared<Vec<(Value, Value)>>> {
        match self {
            Self::Map(entries) => Some(entries),
            Self::Null
            | Self::Bool(_)
            | Self::Char(_)
            | Self::Text(_)
            | Self::Date(_)
            | Self::Timestamp(_)
            | Self::Uuid(_)
            | Self::Uri(_)
            | Self::Number(_)
            | Self::List(_)
            | Self::Set(_)
            | Self::Array(_)
            | Self::Record(_) => None,
        }
    }
}

// Identity-based Debug: derived Debug would recurse forever on cyclic graphs.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Char(c) => write!(f, "Char({c:?})"),
            Self::Text(s) => write!(f, "Text({s:?})"),
            Self::Date(d) => write!(f, "Date({d})"),
            Self::Timestamp(t) => write!(f, "Timestamp({t})"),
            Self::Uuid(u) => write!(f, "Uuid({u})"),
            Self::Uri(u) => write!(f, "Uri({u:?})"),
            Self::Number(n) => write!(f, "Number({n:?})"),
            Self::List(_) | Self::Set(_) | Self::Map(_) | Self::Array(_) | Self::Record(_) => {
                write!(
                    f,
                    "{}(len={}, @{:#x})",
                    self.type_name(),
                    self.len().unwrap_or(0),
                    self.identity().unwrap_or(0)
                )
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(Number::Int(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(Number::Int(i64::from(n)))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(Number::UInt(n))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(Number::F64(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Number(Number::F32(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(Rc::from(s))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

// ---------------------------------------------------------------------------
// JSON conversion
// ---------------------------------------------------------------------------

/// How JSON objects and arrays are mapped onto [`Value`] shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonShape {
    /// Map JSON objects to records of type `Object` instead of maps.
    pub objects_as_records: bool,
    /// Map JSON arrays to unordered sets instead of lists.
    pub arrays_as_sets: bool,
}

impl Value {
    /// Converts a JSON document using the given shape mapping.
    pub fn from_json_with(json: &serde_json::Value, shape: JsonShape) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Number(Number::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Number(Number::UInt(u))
                } else if let Some(f) = n.as_f64() {
                    Self::Number(Number::F64(f))
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::text(s),
            serde_json::Value::Array(items) => {
                let items = items.iter().map(|v| Self::from_json_with(v, shape));
                if shape.arrays_as_sets {
                    Self::set(items)
                } else {
                    Self::list(items)
                }
            }
            serde_json::Value::Object(map) => {
                if shape.objects_as_records {
                    let mut record = Record::new("Object");
                    for (k, v) in map {
                        record.set(k.clone(), Self::from_json_with(v, shape));
                    }
                    Self::record(record)
                } else {
                    Self::map(
                        map.iter()
                            .map(|(k, v)| (Self::text(k), Self::from_json_with(v, shape))),
                    )
                }
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json_with(&json, JsonShape::default())
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Self::from_json_with(json, JsonShape::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn containers_have_identity_scalars_do_not() {
        let list = Value::list([Value::int(1)]);
        let alias = list.clone();
        assert!(list.identity().is_some());
        assert_eq!(list.identity(), alias.identity());
        assert_ne!(list.identity(), Value::list([Value::int(1)]).identity());
        assert_eq!(Value::int(1).identity(), None);
        assert_eq!(Value::text("x").identity(), None);
    }

    #[test]
    fn dismantle_tears_down_deep_nesting() {
        let mut v = Value::Null;
        for _ in 0..1_000_000 {
            v = Value::list([v]);
        }
        v.dismantle();
    }

    #[test]
    fn dismantle_leaves_shared_containers_intact() {
        let shared = Value::list([Value::int(1), Value::int(2)]);
        let outer = Value::map([(Value::text("k"), shared.clone())]);
        outer.dismantle();
        assert_eq!(shared.len(), Some(2));
    }

    #[test]
    fn element_type_nesting_and_display() {
        let t = ElementType::named("i32").array_of();
        assert_eq!(t.nesting(), 1);
        assert_eq!(t.to_string(), "i32[]");
        let array = Value::array(t, []);
        assert_eq!(array.type_name(), "i32[][]");
        if let Value::Array(a) = &array {
            assert_eq!(a.borrow().dimensions(), 2);
        }
    }

    #[test]
    fn record_set_replaces_existing_member() {
        let mut r = Record::new("Person").with_field("age", Value::int(27));
        r.set("age", Value::int(34));
        assert_eq!(r.fields.len(), 1);
        assert_eq!(
            r.get("age").and_then(Value::as_number).map(Number::type_name),
            Some("i64")
        );
    }

    #[test]
    fn debug_on_cyclic_record_terminates() {
        let node = Value::record(Record::new("Node"));
        if let Value::Record(r) = &node {
            r.borrow_mut().set("next", node.clone());
        }
        let rendered = format!("{node:?}");
        assert!(rendered.starts_with("Node(len=1"), "got {rendered}");
    }

    #[test]
    fn json_objects_become_maps_by_default() {
        let v = Value::from(serde_json::json!({"a": [1, 2.5, "x"], "b": null}));
        assert_eq!(v.type_name(), "Map");
        assert_eq!(v.len(), Some(2));
    }

    #[test]
    fn json_shape_maps_objects_to_records_and_arrays_to_sets() {
        let shape = JsonShape {
            objects_as_records: true,
            arrays_as_sets: true,
        };
        let v = Value::from_json_with(&serde_json::json!({"tags": ["a", "b"]}), shape);
        let record = v.as_record().expect("record");
        assert_eq!(record.borrow().type_name, "Object");
        let tags = record.borrow().get("tags").cloned().expect("tags");
        assert_eq!(tags.type_name(), "Set");
    }

    #[test]
    fn large_json_integers_become_unsigned() {
        let v = Value::from(serde_json::json!(u64::MAX));
        assert!(matches!(v, Value::Number(Number::UInt(u64::MAX))));
    }
}
