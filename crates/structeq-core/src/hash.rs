//! Structural, cycle-safe deep hash.
//!
//! The hash only seeds candidate buckets for unordered matching; equality is
//! always decided by a full comparison. It is computed by an explicit task
//! stack (post-order evaluation), never by native recursion, so arbitrarily
//! deep values cannot overflow the call stack.
//!
//! # Rules
//!
//! - Lists and arrays fold element hashes in order (`h = 31 * h + e`).
//! - Sets and maps sum member hashes, so member order is irrelevant. Map keys
//!   and values are hashed independently.
//! - Floats are rounded to a fixed scale (`1e10` for `f64`, `1e5` for `f32`)
//!   before hashing, and every number whose (rounded) value is integral hashes
//!   as that integer, so `1`, `1.0` and `Decimal(1.00)` collide on purpose.
//! - Records use the type's custom hash when one is registered; otherwise
//!   their readable member values are folded in declaration order.
//! - A container reached again while it is still being hashed (a cycle)
//!   contributes a fixed constant. Finished containers are memoised by
//!   identity, so shared sub-graphs hash the same as copies.
use std::collections::{HashMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};

use bigdecimal::ToPrimitive;

use crate::introspect::{Introspector, TypeRegistry};
use crate::value::{Number, Value};

const SCALE_F64: f64 = 1e10;
const SCALE_F32: f64 = 1e5;
const CYCLE_HASH: u64 = 0x9e37_79b9_7f4a_7c15;
const NULL_HASH: u64 = 0;

/// Deep hash with no custom rules.
pub fn deep_hash(value: &Value) -> u64 {
    deep_hash_with(value, &TypeRegistry::new())
}

/// Deep hash honouring the custom hashes supplied by `introspector`.
pub fn deep_hash_with(value: &Value, introspector: &dyn Introspector) -> u64 {
    deep_hash_memoised(value, introspector, &mut HashMap::new())
}

/// Deep hash that reads and extends `memo`, a cache of container hashes
/// keyed by identity.
///
/// The comparison engine keeps one memo per comparison so that hashing every
/// level of a deeply nested unordered container stays linear overall.
pub(crate) fn deep_hash_memoised(
    value: &Value,
    introspector: &dyn Introspector,
    memo: &mut HashMap<usize, u64>,
) -> u64 {
    DeepHasher::new(introspector, memo).hash(value)
}

enum Task {
    Enter(Value),
    /// Fold the last `n` results in order, starting from `seed`.
    Fold { seed: u64, n: usize },
    /// Sum the last `n` results.
    Sum(usize),
    /// The container with this identity is finished; memoise the top result.
    Exit(usize),
}

struct DeepHasher<'a> {
    introspector: &'a dyn Introspector,
    in_progress: HashSet<usize>,
    memo: &'a mut HashMap<usize, u64>,
}

impl<'a> DeepHasher<'a> {
    fn new(introspector: &'a dyn Introspector, memo: &'a mut HashMap<usize, u64>) -> Self {
        Self {
            introspector,
            in_progress: HashSet::new(),
            memo,
        }
    }

    fn hash(&mut self, root: &Value) -> u64 {
        let mut tasks = vec![Task::Enter(root.clone())];
        let mut results: Vec<u64> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Enter(value) => self.enter(&value, &mut tasks, &mut results),
                Task::Fold { seed, n } => {
                    let start = results.len().saturating_sub(n);
                    let folded = results
                        .drain(start..)
                        .fold(seed, |h, e| h.wrapping_mul(31).wrapping_add(e));
                    results.push(folded);
                }
                Task::Sum(n) => {
                    let start = results.len().saturating_sub(n);
                    let summed = results.drain(start..).fold(0u64, u64::wrapping_add);
                    results.push(summed);
                }
                Task::Exit(identity) => {
                    self.in_progress.remove(&identity);
                    if let Some(&h) = results.last() {
                        self.memo.insert(identity, h);
                    }
                }
            }
        }
        results.pop().unwrap_or(NULL_HASH)
    }

    fn enter(&mut self, value: &Value, tasks: &mut Vec<Task>, results: &mut Vec<u64>) {
        if let Some(identity) = value.identity() {
            if let Some(&h) = self.memo.get(&identity) {
                results.push(h);
                return;
            }
            if !self.in_progress.insert(identity) {
                results.push(CYCLE_HASH);
                return;
            }
            tasks.push(Task::Exit(identity));
        }

        match value {
            Value::Null => results.push(NULL_HASH),
            Value::Bool(b) => results.push(tagged(1, b)),
            Value::Char(c) => results.push(tagged(2, c)),
            Value::Text(s) => results.push(tagged(3, &**s)),
            Value::Date(d) => results.push(tagged(4, d)),
            Value::Timestamp(t) => results.push(tagged(5, t)),
            Value::Uuid(u) => results.push(tagged(6, u)),
            Value::Uri(u) => results.push(tagged(7, &**u)),
            Value::Number(n) => results.push(hash_number(n)),
            Value::List(items) => {
                let items = items.borrow();
                push_children(tasks, Task::Fold { seed: 1, n: items.len() }, items.iter().cloned());
            }
            Value::Array(array) => {
                let array = array.borrow();
                push_children(
                    tasks,
                    Task::Fold {
                        seed: 1,
                        n: array.elements.len(),
                    },
                    array.elements.iter().cloned(),
                );
            }
            Value::Set(items) => {
                let items = items.borrow();
                push_children(tasks, Task::Sum(items.len()), items.iter().cloned());
            }
            Value::Map(entries) => {
                let entries = entries.borrow();
                push_children(
                    tasks,
                    Task::Sum(entries.len() * 2),
                    entries
                        .iter()
                        .flat_map(|(k, v)| [k.clone(), v.clone()]),
                );
            }
            Value::Record(record) => {
                let record = record.borrow();
                if let Some(custom) = self.introspector.custom_hash(&record.type_name) {
                    results.push(custom(&record));
                    return;
                }
                let members: Vec<Value> = self
                    .introspector
                    .members(&record)
                    .iter()
                    .filter_map(|m| self.introspector.read(&record, m).ok())
                    .collect();
                push_children(
                    tasks,
                    Task::Fold {
                        seed: tagged(8, &record.type_name),
                        n: members.len(),
                    },
                    members,
                );
            }
        }
    }
}

/// Pushes `combine` and then the children so that the first child is
/// evaluated first and its result ends up lowest on the result stack.
fn push_children(tasks: &mut Vec<Task>, combine: Task, children: impl IntoIterator<Item = Value>) {
    tasks.push(combine);
    let children: Vec<Value> = children.into_iter().collect();
    tasks.extend(children.into_iter().rev().map(Task::Enter));
}

fn tagged<T: Hash + ?Sized>(tag: u8, value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    value.hash(&mut hasher);
    hasher.finish()
}

fn hash_integral(n: i128) -> u64 {
    tagged(0, &n)
}

fn hash_float(v: f64, scale: f64) -> u64 {
    let rounded = (v * scale).round() / scale;
    if rounded.is_finite() && rounded.fract() == 0.0 && rounded.abs() < 1e38 {
        return hash_integral(rounded as i128);
    }
    let mut hasher = DefaultHasher::new();
    0u8.hash(&mut hasher);
    rounded.to_bits().hash(&mut hasher);
    hasher.finish()
}

fn hash_number(n: &Number) -> u64 {
    match n {
        Number::Int(v) => hash_integral(i128::from(*v)),
        Number::UInt(v) => hash_integral(i128::from(*v)),
        Number::F64(v) => hash_float(*v, SCALE_F64),
        Number::F32(v) => hash_float(f64::from(*v), SCALE_F32),
        Number::Decimal(d) => {
            if d.is_integer() {
                if let Some(i) = d.to_i128() {
                    return hash_integral(i);
                }
            }
            hash_float(d.to_f64().unwrap_or(f64::NAN), SCALE_F64)
        }
    }
}
