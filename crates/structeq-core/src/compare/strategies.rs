//! Per-shape decomposition: each strategy either resolves its pair directly
//! or pushes finer-grained child comparisons back onto the run's stack.
use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::difference::Difference;
use crate::error::CompareError;
use crate::introspect::{Introspector, Member};
use crate::value::{Record, Value};

use super::engine::{Run, Step};
use super::node::{Access, NodeId};

// ---------------------------------------------------------------------------
// Candidate matching for unordered containers
// ---------------------------------------------------------------------------

/// Right-hand candidates bucketed by deep hash, consumed as they match.
pub(super) struct CandidatePool {
    buckets: HashMap<u64, Vec<usize>>,
    hashes: Vec<u64>,
    claimed: Vec<bool>,
}

/// Position of one left-hand item's search through a [`CandidatePool`].
pub(super) struct Candidates {
    hash: u64,
    in_bucket: usize,
    scanned: usize,
}

impl Candidates {
    fn new(hash: u64) -> Self {
        Self {
            hash,
            in_bucket: 0,
            scanned: 0,
        }
    }
}

impl CandidatePool {
    pub(super) fn new(hashes: Vec<u64>) -> Self {
        let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
        for (i, h) in hashes.iter().enumerate() {
            buckets.entry(*h).or_default().push(i);
        }
        let claimed = vec![false; hashes.len()];
        Self {
            buckets,
            hashes,
            claimed,
        }
    }

    /// The next unclaimed candidate to try.
    ///
    /// Candidates sharing the cursor's hash come first. The hash is only a
    /// hint, so once they are exhausted every other unclaimed candidate
    /// follows.
    fn next(&self, cursor: &mut Candidates) -> Option<usize> {
        if let Some(&candidate) = self
            .buckets
            .get(&cursor.hash)
            .and_then(|bucket| bucket.get(cursor.in_bucket))
        {
            cursor.in_bucket += 1;
            return Some(candidate);
        }
        while let Some(&h) = self.hashes.get(cursor.scanned) {
            let candidate = cursor.scanned;
            cursor.scanned += 1;
            if !self.claimed[candidate] && h != cursor.hash {
                return Some(candidate);
            }
        }
        None
    }

    /// Takes `candidate` out of the pool and returns its hash.
    fn claim(&mut self, candidate: usize) -> u64 {
        self.claimed[candidate] = true;
        let hash = self.hashes[candidate];
        if let Some(bucket) = self.buckets.get_mut(&hash) {
            bucket.retain(|&c| c != candidate);
        }
        hash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unordered {
    Elements,
    Keys,
}

/// A set or map-key matching in progress.
///
/// Each left item is tried against candidates one probe at a time. The frame
/// owning the container is suspended between probes, with this state parked
/// in it.
pub(super) struct Matching {
    node: NodeId,
    depth: usize,
    kind: Unordered,
    left: Vec<Value>,
    left_values: Vec<Value>,
    right: Vec<Value>,
    right_values: Vec<Value>,
    pool: CandidatePool,
    /// Left item being matched.
    index: usize,
    cursor: Option<Candidates>,
    /// Candidate under probe.
    probing: Option<usize>,
    /// Value comparisons under matched map keys.
    children: Vec<(Value, Value, Access)>,
}

impl Matching {
    fn accept(&mut self, candidate: usize) {
        let i = self.index;
        let claimed_hash = self.pool.claim(candidate);
        if let Some(cursor) = self.cursor.take() {
            if cursor.hash != claimed_hash {
                trace!(hash = cursor.hash, "candidate matched outside its hash bucket");
            }
        }
        if self.kind == Unordered::Keys {
            self.children.push((
                self.left_values[i].clone(),
                self.right_values[candidate].clone(),
                Access::MapKey(self.left[i].clone()),
            ));
        }
        self.index += 1;
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

impl Run<'_> {
    /// Lists: sizes must agree, then element `i` is compared with element `i`.
    pub(super) fn compare_lists(
        &mut self,
        id: NodeId,
        left: &Value,
        right: &Value,
    ) -> Result<Step, CompareError> {
        let (left, right) = match (left.as_elements(), right.as_elements()) {
            (Some(l), Some(r)) => (l.borrow().clone(), r.borrow().clone()),
            _ => return Ok(self.fail(id, Difference::CollectionTypeMismatch)),
        };
        self.engine.guard.check_collection(left.len())?;
        self.engine.guard.check_collection(right.len())?;
        if left.len() != right.len() {
            return Ok(self.fail(id, Difference::CollectionSizeMismatch));
        }
        let children = left
            .into_iter()
            .zip(right)
            .enumerate()
            .map(|(i, (l, r))| (l, r, Access::Element(i)))
            .collect();
        self.push_children(id, children)?;
        Ok(Step::Continue)
    }

    /// Sets: sizes must agree, then every left element must claim a distinct
    /// fully-equal right element.
    pub(super) fn compare_sets(
        &mut self,
        id: NodeId,
        left: &Value,
        right: &Value,
    ) -> Result<Step, CompareError> {
        let (left, right) = match (left.as_elements(), right.as_elements()) {
            (Some(l), Some(r)) => (l.borrow().clone(), r.borrow().clone()),
            _ => return Ok(self.fail(id, Difference::CollectionTypeMismatch)),
        };
        self.engine.guard.check_collection(left.len())?;
        self.engine.guard.check_collection(right.len())?;
        if left.len() != right.len() {
            return Ok(self.fail(id, Difference::CollectionSizeMismatch));
        }

        let pool = CandidatePool::new(right.iter().map(|v| self.engine.hash(v)).collect());
        self.match_next(Matching {
            node: id,
            depth: self.frame.nodes[id].depth + 1,
            kind: Unordered::Elements,
            left,
            left_values: Vec::new(),
            right,
            right_values: Vec::new(),
            pool,
            index: 0,
            cursor: None,
            probing: None,
            children: Vec::new(),
        })
    }

    /// Maps: sizes must agree, every left key must claim a fully-equal right
    /// key, then the values under each matched key pair are compared.
    pub(super) fn compare_maps(
        &mut self,
        id: NodeId,
        left: &Value,
        right: &Value,
    ) -> Result<Step, CompareError> {
        let (left, right) = match (left.as_entries(), right.as_entries()) {
            (Some(l), Some(r)) => (l.borrow().clone(), r.borrow().clone()),
            _ => return Ok(self.fail(id, Difference::TypeMismatch)),
        };
        self.engine.guard.check_map(left.len())?;
        self.engine.guard.check_map(right.len())?;
        if left.len() != right.len() {
            return Ok(self.fail(id, Difference::MapSizeMismatch));
        }

        let (left, left_values): (Vec<Value>, Vec<Value>) = left.into_iter().unzip();
        let (right, right_values): (Vec<Value>, Vec<Value>) = right.into_iter().unzip();
        let pool = CandidatePool::new(right.iter().map(|k| self.engine.hash(k)).collect());
        self.match_next(Matching {
            node: id,
            depth: self.frame.nodes[id].depth + 1,
            kind: Unordered::Keys,
            children: Vec::with_capacity(left.len()),
            left,
            left_values,
            right,
            right_values,
            pool,
            index: 0,
            cursor: None,
            probing: None,
        })
    }

    /// Feeds the outcome of the last candidate probe back into the suspended
    /// matching.
    pub(super) fn resume_matching(&mut self, equal: bool) -> Result<Step, CompareError> {
        let Some(mut matching) = self.frame.matching.take() else {
            return Ok(Step::Continue);
        };
        if let Some(candidate) = matching.probing.take() {
            if equal {
                matching.accept(candidate);
            }
        }
        self.match_next(matching)
    }

    /// Requests a probe of the current left item against its next candidate,
    /// fails when none is left, or finishes once every item is matched.
    fn match_next(&mut self, mut matching: Matching) -> Result<Step, CompareError> {
        let i = matching.index;
        let Some(item) = matching.left.get(i).cloned() else {
            let Matching { node, children, .. } = matching;
            self.push_children(node, children)?;
            return Ok(Step::Continue);
        };

        let engine = self.engine;
        let cursor = matching
            .cursor
            .get_or_insert_with(|| Candidates::new(engine.hash(&item)));
        match matching.pool.next(cursor) {
            Some(candidate) => {
                let right = matching.right[candidate].clone();
                let depth = matching.depth;
                matching.probing = Some(candidate);
                self.frame.matching = Some(matching);
                Ok(Step::Probe {
                    left: item,
                    right,
                    depth,
                })
            }
            None => {
                let (difference, access) = match matching.kind {
                    Unordered::Elements => {
                        (Difference::CollectionMissingElement, Some(Access::Element(i)))
                    }
                    Unordered::Keys => (Difference::MapMissingKey, None),
                };
                Ok(self.fail_missing(matching.node, difference, item, access))
            }
        }
    }

    /// Arrays: dimensions, then element type, then length, then elements by
    /// index.
    pub(super) fn compare_arrays(
        &mut self,
        id: NodeId,
        left: &Value,
        right: &Value,
    ) -> Result<Step, CompareError> {
        let (Value::Array(left), Value::Array(right)) = (left, right) else {
            return Ok(self.fail(id, Difference::TypeMismatch));
        };
        let (left, right) = (left.borrow().clone(), right.borrow().clone());
        if left.dimensions() != right.dimensions() {
            return Ok(self.fail(id, Difference::ArrayDimensionMismatch));
        }
        if left.element_type != right.element_type {
            return Ok(self.fail(id, Difference::ArrayComponentTypeMismatch));
        }
        self.engine.guard.check_array(left.elements.len())?;
        self.engine.guard.check_array(right.elements.len())?;
        if left.elements.len() != right.elements.len() {
            return Ok(self.fail(id, Difference::ArrayLengthMismatch));
        }
        let children = left
            .elements
            .into_iter()
            .zip(right.elements)
            .enumerate()
            .map(|(i, (l, r))| (l, r, Access::ArrayIndex(i)))
            .collect();
        self.push_children(id, children)?;
        Ok(Step::Continue)
    }

    /// Records: same concrete type required. A registered, unsuppressed
    /// custom equivalence decides on its own; otherwise members are compared
    /// by name.
    pub(super) fn compare_records(
        &mut self,
        id: NodeId,
        left: &Value,
        right: &Value,
    ) -> Result<Step, CompareError> {
        let (Some(left), Some(right)) = (left.as_record(), right.as_record()) else {
            return Ok(self.fail(id, Difference::TypeMismatch));
        };
        let (left, right) = (left.borrow(), right.borrow());
        if left.type_name != right.type_name {
            return Ok(self.fail(id, Difference::TypeMismatch));
        }

        let introspector = self.engine.introspector;
        if !self.options.custom_equivalence.suppresses(&left.type_name) {
            if let Some(rule) = introspector.custom_equivalence(&left.type_name) {
                if rule(&left, &right) {
                    return Ok(Step::Continue);
                }
                let type_name = left.type_name.clone();
                drop(left);
                drop(right);
                return self.recover_custom_detail(id, &type_name);
            }
        }

        let left_members = introspector.members(&left);
        let right_members = introspector.members(&right);
        self.engine.guard.check_record(left_members.len())?;
        self.engine.guard.check_record(right_members.len())?;
        let children = member_pairs(
            introspector,
            (&*left, left_members.as_slice()),
            (&*right, right_members.as_slice()),
        );
        drop(left);
        drop(right);
        self.push_children(id, children)?;
        Ok(Step::Continue)
    }
}

/// Pairs up the readable members of two records by name.
///
/// A member present on only one side is compared against `Null`. A member
/// that fails to read on either side contributes nothing.
fn member_pairs(
    introspector: &dyn Introspector,
    (left, left_members): (&Record, &[Member]),
    (right, right_members): (&Record, &[Member]),
) -> Vec<(Value, Value, Access)> {
    let left_by_name = by_name(left_members);
    let right_by_name = by_name(right_members);
    let mut seen: HashSet<&str> = HashSet::with_capacity(left_members.len());
    let names = left_members
        .iter()
        .chain(right_members)
        .map(|m| m.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect::<Vec<_>>();

    let mut pairs = Vec::with_capacity(names.len());
    for name in names {
        let l = read_member(introspector, left, left_by_name.get(name).copied());
        let r = read_member(introspector, right, right_by_name.get(name).copied());
        if let (Some(l), Some(r)) = (l, r) {
            pairs.push((l, r, Access::Field(name.to_owned())));
        } else {
            trace!(record = %left.type_name, member = name, "unreadable member skipped");
        }
    }
    pairs
}

fn by_name(members: &[Member]) -> HashMap<&str, &Member> {
    members.iter().map(|m| (m.name.as_str(), m)).collect()
}

fn read_member(
    introspector: &dyn Introspector,
    record: &Record,
    member: Option<&Member>,
) -> Option<Value> {
    match member {
        Some(member) => introspector.read(record, member).ok(),
        None => Some(Value::Null),
    }
}
