//! Record introspection: which members a record exposes, how to read them,
//! and which types carry their own equivalence or hash rule.
//!
//! The engine never enumerates record members itself; it asks an
//! [`Introspector`]. [`TypeRegistry`] is the stock implementation, reading
//! members straight from [`Record::fields`].
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::value::{Record, Value};

/// Custom equivalence rule for one record type.
pub type CustomEquivalenceFn = dyn Fn(&Record, &Record) -> bool;

/// Custom hash rule for one record type.
pub type CustomHashFn = dyn Fn(&Record) -> u64;

/// A readable member of a record, as reported by [`Introspector::members`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member name.
    pub name: String,
    /// Position of the member in [`Record::fields`].
    pub index: usize,
}

/// Failure to read a member value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// The member exists but may not be read.
    Inaccessible {
        /// Record type.
        type_name: String,
        /// Member name.
        member: String,
    },
    /// The member is not present on this record instance.
    Missing {
        /// Record type.
        type_name: String,
        /// Member name.
        member: String,
    },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inaccessible { type_name, member } => {
                write!(f, "member {type_name}.{member} is not accessible")
            }
            Self::Missing { type_name, member } => {
                write!(f, "member {type_name}.{member} is missing")
            }
        }
    }
}

impl std::error::Error for ReadError {}

/// Supplies member enumeration and custom rules to the engine.
pub trait Introspector {
    /// Members of `record` in declaration order, excluding synthesized ones.
    fn members(&self, record: &Record) -> Vec<Member>;

    /// Reads one member value.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when the member cannot be read. The engine
    /// treats such members as contributing nothing to the comparison.
    fn read(&self, record: &Record, member: &Member) -> Result<Value, ReadError>;

    /// The custom equivalence registered for `type_name`, if any.
    fn custom_equivalence(&self, type_name: &str) -> Option<&CustomEquivalenceFn>;

    /// The custom hash registered for `type_name`, if any.
    fn custom_hash(&self, type_name: &str) -> Option<&CustomHashFn>;
}

/// Registry of per-type custom rules and member access restrictions.
#[derive(Default)]
pub struct TypeRegistry {
    equivalences: HashMap<String, Box<CustomEquivalenceFn>>,
    hashes: HashMap<String, Box<CustomHashFn>>,
    inaccessible: HashMap<String, HashSet<String>>,
}

impl TypeRegistry {
    /// An empty registry: no custom rules, every member readable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom equivalence for `type_name`.
    pub fn with_equivalence(
        mut self,
        type_name: impl Into<String>,
        rule: impl Fn(&Record, &Record) -> bool + 'static,
    ) -> Self {
        self.equivalences.insert(type_name.into(), Box::new(rule));
        self
    }

    /// Registers a custom hash for `type_name`.
    pub fn with_hash(
        mut self,
        type_name: impl Into<String>,
        rule: impl Fn(&Record) -> u64 + 'static,
    ) -> Self {
        self.hashes.insert(type_name.into(), Box::new(rule));
        self
    }

    /// Marks `member` of `type_name` as unreadable.
    pub fn with_inaccessible(
        mut self,
        type_name: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        self.inaccessible
            .entry(type_name.into())
            .or_default()
            .insert(member.into());
        self
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut eq: Vec<&String> = self.equivalences.keys().collect();
        let mut hash: Vec<&String> = self.hashes.keys().collect();
        eq.sort();
        hash.sort();
        f.debug_struct("TypeRegistry")
            .field("equivalences", &eq)
            .field("hashes", &hash)
            .field("inaccessible", &self.inaccessible)
            .finish()
    }
}

impl Introspector for TypeRegistry {
    fn members(&self, record: &Record) -> Vec<Member> {
        record
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.synthetic)
            .map(|(index, field)| Member {
                name: field.name.clone(),
                index,
            })
            .collect()
    }

    fn read(&self, record: &Record, member: &Member) -> Result<Value, ReadError> {
        if self
            .inaccessible
            .get(&record.type_name)
            .is_some_and(|hidden| hidden.contains(&member.name))
        {
            return Err(ReadError::Inaccessible {
                type_name: record.type_name.clone(),
                member: member.name.clone(),
            });
        }
        record
            .fields
            .get(member.index)
            .filter(|field| field.name == member.name)
            .map(|field| field.value.clone())
            .ok_or_else(|| ReadError::Missing {
                type_name: record.type_name.clone(),
                member: member.name.clone(),
            })
    }

    fn custom_equivalence(&self, type_name: &str) -> Option<&CustomEquivalenceFn> {
        self.equivalences.get(type_name).map(AsRef::as_ref)
    }

    fn custom_hash(&self, type_name: &str) -> Option<&CustomHashFn> {
        self.hashes.get(type_name).map(AsRef::as_ref)
    }
}
