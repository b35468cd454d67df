use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::config::{CompareOptions, DeepEqualsConfig};
use crate::difference::Difference;
use crate::error::CompareError;
use crate::hash::deep_hash_memoised;
use crate::introspect::Introspector;
use crate::limits::ResourceGuard;
use crate::numeric::{numbers_equal, text_matches_number};
use crate::shape::{Shape, classify};
use crate::value::Value;

use super::node::{Access, ComparisonNode, Mismatch, NodeId};
use super::strategies::Matching;

/// A (left, right) container or record pair, keyed by shape and identity.
///
/// The shape is part of the key because one shared allocation can be viewed
/// as a list by one handle and as a set by another.
pub(super) type Pair = (Shape, usize, usize);

/// Result of one comparison.
pub(crate) enum Outcome {
    Equal,
    Unequal(Mismatch),
}

/// Result of evaluating one node.
pub(super) enum Step {
    /// Resolved or decomposed; keep draining the stack.
    Continue,
    /// The comparison failed at this node.
    Fail(NodeId),
    /// Suspend the current frame until this candidate pair is decided.
    Probe {
        left: Value,
        right: Value,
        depth: usize,
    },
    /// The frame's stack is empty: everything in it compared equal.
    Done,
}

/// Shared, read-only state for every frame started by one comparison.
pub(crate) struct Engine<'a> {
    pub(super) config: &'a DeepEqualsConfig,
    pub(super) introspector: &'a dyn Introspector,
    pub(super) guard: ResourceGuard<'a>,
    hashes: RefCell<HashMap<usize, u64>>,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(config: &'a DeepEqualsConfig, introspector: &'a dyn Introspector) -> Self {
        Self {
            config,
            introspector,
            guard: ResourceGuard::new(config),
            hashes: RefCell::new(HashMap::new()),
        }
    }

    /// Top-level comparison of `left` and `right`.
    pub(crate) fn compare(
        &self,
        left: &Value,
        right: &Value,
        options: &CompareOptions,
    ) -> Result<Outcome, CompareError> {
        Machine::new(self, options).execute(left.clone(), right.clone(), 0)
    }

    /// Deep hash of `value`, memoised for the lifetime of the comparison.
    pub(super) fn hash(&self, value: &Value) -> u64 {
        deep_hash_memoised(value, self.introspector, &mut self.hashes.borrow_mut())
    }
}

/// State of one comparison run.
///
/// The bottom frame is the comparison the caller asked for. Every frame
/// above it is a candidate probe started by the frame below, which stays
/// suspended in its [`Matching`] until the probe reports back.
pub(super) struct Frame {
    recover_detail: bool,
    pub(super) nodes: Vec<ComparisonNode>,
    expanded: Vec<bool>,
    stack: Vec<NodeId>,
    /// Pairs this frame added to the machine's visited set.
    entered: Vec<Pair>,
    pub(super) matching: Option<Matching>,
}

impl Frame {
    fn new(recover_detail: bool) -> Self {
        Self {
            recover_detail,
            nodes: Vec::new(),
            expanded: Vec::new(),
            stack: Vec::new(),
            entered: Vec::new(),
            matching: None,
        }
    }

    fn push(&mut self, node: ComparisonNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.expanded.push(false);
        self.stack.push(id);
        id
    }
}

/// Drives a stack of [`Frame`]s with a single loop.
///
/// Nested unordered containers suspend frames instead of recursing, so the
/// native stack stays flat however deep the values are.
struct Machine<'m> {
    engine: &'m Engine<'m>,
    options: &'m CompareOptions,
    frames: Vec<Frame>,
    /// Pairs entered by any live frame. A pair met again is a cycle and
    /// counts as equal so far.
    visited: HashSet<Pair>,
}

impl<'m> Machine<'m> {
    fn new(engine: &'m Engine<'m>, options: &'m CompareOptions) -> Self {
        Self {
            engine,
            options,
            frames: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Compares `(left, right)` at `depth` to completion.
    ///
    /// The head of a frame's stack is peeked, not popped: the first visit
    /// expands it, the second retires it. Children pushed during expansion
    /// therefore resolve before their parent is retired.
    fn execute(
        mut self,
        left: Value,
        right: Value,
        depth: usize,
    ) -> Result<Outcome, CompareError> {
        self.start(left, right, depth, true)?;
        let mut answer: Option<bool> = None;

        while let Some(frame) = self.frames.last_mut() {
            let mut run = Run {
                engine: self.engine,
                options: self.options,
                visited: &mut self.visited,
                frame,
            };
            let step = match answer.take() {
                Some(equal) => run.resume_matching(equal)?,
                None => run.advance()?,
            };
            match step {
                Step::Continue => {}
                Step::Probe { left, right, depth } => self.start(left, right, depth, false)?,
                Step::Fail(failing) => {
                    if let Some(frame) = self.finish() {
                        if self.frames.is_empty() {
                            return Ok(Outcome::Unequal(conclude(frame, failing)));
                        }
                    }
                    answer = Some(false);
                }
                Step::Done => {
                    self.finish();
                    answer = Some(true);
                }
            }
        }
        Ok(Outcome::Equal)
    }

    fn start(
        &mut self,
        left: Value,
        right: Value,
        depth: usize,
        recover_detail: bool,
    ) -> Result<(), CompareError> {
        self.engine.guard.check_depth(depth)?;
        let mut frame = Frame::new(recover_detail);
        frame.push(ComparisonNode::root(left, right, depth));
        self.frames.push(frame);
        Ok(())
    }

    /// Pops the top frame and forgets the pairs it entered.
    fn finish(&mut self) -> Option<Frame> {
        let frame = self.frames.pop()?;
        for pair in &frame.entered {
            self.visited.remove(pair);
        }
        Some(frame)
    }
}

fn conclude(frame: Frame, failing: NodeId) -> Mismatch {
    if frame.recover_detail {
        let node = &frame.nodes[failing];
        debug!(
            difference = ?node.difference,
            depth = node.depth,
            "values differ"
        );
    }
    Mismatch::new(frame.nodes, failing)
}

/// The top frame of a [`Machine`] together with the state shared by all
/// frames. Strategies are implemented on this view.
pub(super) struct Run<'r> {
    pub(super) engine: &'r Engine<'r>,
    pub(super) options: &'r CompareOptions,
    visited: &'r mut HashSet<Pair>,
    pub(super) frame: &'r mut Frame,
}

impl Run<'_> {
    /// Evaluates the next unexpanded node of the frame.
    fn advance(&mut self) -> Result<Step, CompareError> {
        while let Some(&id) = self.frame.stack.last() {
            if self.frame.expanded[id] {
                self.frame.stack.pop();
                continue;
            }
            self.frame.expanded[id] = true;
            return self.evaluate(id);
        }
        Ok(Step::Done)
    }

    /// Pushes child comparisons so that the first one is resolved first.
    pub(super) fn push_children(
        &mut self,
        parent: NodeId,
        children: Vec<(Value, Value, Access)>,
    ) -> Result<(), CompareError> {
        let depth = self.frame.nodes[parent].depth + 1;
        if !children.is_empty() {
            self.engine.guard.check_depth(depth)?;
        }
        for (left, right, access) in children.into_iter().rev() {
            self.frame.push(ComparisonNode::child(
                parent,
                depth,
                left,
                right,
                Some(access),
            ));
        }
        Ok(())
    }

    pub(super) fn fail(&mut self, id: NodeId, difference: Difference) -> Step {
        self.frame.nodes[id].difference = Some(difference);
        Step::Fail(id)
    }

    /// Fails `id` with a missing-counterpart difference and appends a witness
    /// node holding the unmatched left-hand item.
    pub(super) fn fail_missing(
        &mut self,
        id: NodeId,
        difference: Difference,
        missing: Value,
        access: Option<Access>,
    ) -> Step {
        self.frame.nodes[id].difference = Some(difference);
        let depth = self.frame.nodes[id].depth + 1;
        let witness = self.frame.nodes.len();
        self.frame
            .nodes
            .push(ComparisonNode::child(id, depth, missing, Value::Null, access));
        self.frame.expanded.push(true);
        Step::Fail(witness)
    }

    /// Value-mismatch label for a node, chosen by how it was reached.
    pub(super) fn value_difference(&self, id: NodeId) -> Difference {
        match &self.frame.nodes[id].access {
            None => Difference::ValueMismatch,
            Some(Access::Field(_)) => Difference::FieldValueMismatch,
            Some(Access::Element(_)) => Difference::CollectionElementMismatch,
            Some(Access::MapKey(_)) => Difference::MapValueMismatch,
            Some(Access::ArrayIndex(_)) => Difference::ArrayElementMismatch,
        }
    }

    fn evaluate(&mut self, id: NodeId) -> Result<Step, CompareError> {
        let left = self.frame.nodes[id].left.clone();
        let right = self.frame.nodes[id].right.clone();

        let left_shape = classify(&left);
        let right_shape = classify(&right);
        if left_shape != right_shape {
            return Ok(self.shape_mismatch(id, &left, &right, left_shape, right_shape));
        }

        if let (Some(a), Some(b)) = (left.identity(), right.identity()) {
            if a == b {
                return Ok(Step::Continue);
            }
            let pair = (left_shape, a, b);
            if !self.visited.insert(pair) {
                return Ok(Step::Continue);
            }
            self.frame.entered.push(pair);
        }

        match left_shape {
            Shape::Null => Ok(Step::Continue),
            Shape::Number => {
                let epsilon = self.engine.config.epsilon;
                let equal = left
                    .as_number()
                    .zip(right.as_number())
                    .is_some_and(|(a, b)| numbers_equal(a, b, epsilon));
                if equal {
                    Ok(Step::Continue)
                } else {
                    Ok(self.fail(id, self.value_difference(id)))
                }
            }
            Shape::Scalar => match scalars_equal(&left, &right) {
                Some(true) => Ok(Step::Continue),
                Some(false) => Ok(self.fail(id, self.value_difference(id))),
                None => Ok(self.fail(id, Difference::TypeMismatch)),
            },
            Shape::List => self.compare_lists(id, &left, &right),
            Shape::Set => self.compare_sets(id, &left, &right),
            Shape::Map => self.compare_maps(id, &left, &right),
            Shape::Array => self.compare_arrays(id, &left, &right),
            Shape::Record => self.compare_records(id, &left, &right),
        }
    }

    fn shape_mismatch(
        &mut self,
        id: NodeId,
        left: &Value,
        right: &Value,
        left_shape: Shape,
        right_shape: Shape,
    ) -> Step {
        if left_shape == Shape::Null || right_shape == Shape::Null {
            return self.fail(id, self.value_difference(id));
        }
        if self.options.strings_match_numbers {
            let epsilon = self.engine.config.epsilon;
            let matched = match (left, right) {
                (Value::Text(text), Value::Number(number))
                | (Value::Number(number), Value::Text(text)) => {
                    Some(text_matches_number(text, number, epsilon))
                }
                _ => None,
            };
            match matched {
                Some(true) => return Step::Continue,
                Some(false) => return self.fail(id, self.value_difference(id)),
                None => {}
            }
        }
        if left_shape.is_collection() || right_shape.is_collection() {
            self.fail(id, Difference::CollectionTypeMismatch)
        } else {
            self.fail(id, Difference::TypeMismatch)
        }
    }

    /// Re-runs the comparison of node `id` with `type_name`'s custom
    /// equivalence suppressed and grafts the divergence it finds under `id`.
    pub(super) fn recover_custom_detail(
        &mut self,
        id: NodeId,
        type_name: &str,
    ) -> Result<Step, CompareError> {
        if !self.frame.recover_detail {
            return Ok(self.fail(id, self.value_difference(id)));
        }
        trace!(type_name, "custom equivalence failed; re-running with it suppressed");
        let options = CompareOptions {
            custom_equivalence: self.options.custom_equivalence.suppressing(type_name),
            ..self.options.clone()
        };
        let node = &self.frame.nodes[id];
        let (left, right, depth) = (node.left.clone(), node.right.clone(), node.depth);
        let outcome = Machine::new(self.engine, &options).execute(left, right, depth)?;
        match outcome {
            Outcome::Equal => Ok(self.fail(id, self.value_difference(id))),
            Outcome::Unequal(mismatch) => Ok(self.graft(id, mismatch)),
        }
    }

    /// Appends the failure chain of a re-run (whose root is the same pair as
    /// `id`) below `id`.
    fn graft(&mut self, id: NodeId, mismatch: Mismatch) -> Step {
        let (nodes, failing) = mismatch.into_parts();
        let mut chain = Vec::new();
        let mut current = Some(failing);
        while let Some(n) = current {
            chain.push(n);
            current = nodes[n].parent;
        }
        chain.reverse();

        let mut chain = chain.into_iter();
        if let Some(difference) = chain.next().and_then(|root| nodes[root].difference) {
            self.frame.nodes[id].difference = Some(difference);
        }
        let mut tail = id;
        for n in chain {
            let mut node = nodes[n].clone();
            node.parent = Some(tail);
            tail = self.frame.nodes.len();
            self.frame.nodes.push(node);
            self.frame.expanded.push(true);
        }
        Step::Fail(tail)
    }
}

/// Equality of two simple scalars; `None` when they are different kinds.
fn scalars_equal(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::Char(a), Value::Char(b)) => Some(a == b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b).is_eq()),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b).is_eq()),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b).is_eq()),
        (Value::Uuid(a), Value::Uuid(b)) => Some(a == b),
        (Value::Uri(a), Value::Uri(b)) => Some(a == b),
        _ => None,
    }
}
