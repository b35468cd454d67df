use std::fmt;

use crate::config::DeepEqualsConfig;
use crate::difference::Difference;
use crate::format;
use crate::value::Value;

/// Index of a [`ComparisonNode`] in its arena.
pub type NodeId = usize;

/// How a node was reached from its parent.
#[derive(Debug, Clone)]
pub enum Access {
    /// A record member.
    Field(String),
    /// A position in a list or set.
    Element(usize),
    /// A position in an array.
    ArrayIndex(usize),
    /// The value stored under this map key.
    MapKey(Value),
}

/// One unit of comparison work: a pair of values plus where it came from.
///
/// Nodes are owned by an arena; `parent` is an index into the same arena.
#[derive(Debug, Clone)]
pub struct ComparisonNode {
    pub(crate) left: Value,
    pub(crate) right: Value,
    pub(crate) parent: Option<NodeId>,
    pub(crate) access: Option<Access>,
    pub(crate) difference: Option<Difference>,
    pub(crate) depth: usize,
}

impl ComparisonNode {
    pub(crate) fn root(left: Value, right: Value, depth: usize) -> Self {
        Self {
            left,
            right,
            parent: None,
            access: None,
            difference: None,
            depth,
        }
    }

    pub(crate) fn child(
        parent: NodeId,
        depth: usize,
        left: Value,
        right: Value,
        access: Option<Access>,
    ) -> Self {
        Self {
            left,
            right,
            parent: Some(parent),
            access,
            difference: None,
            depth,
        }
    }

    /// Left-hand (expected) value.
    pub fn left(&self) -> &Value {
        &self.left
    }

    /// Right-hand (found) value.
    pub fn right(&self) -> &Value {
        &self.right
    }

    /// How this node was reached from its parent; `None` for the root.
    pub fn access(&self) -> Option<&Access> {
        self.access.as_ref()
    }

    /// The difference attached to this node, if it failed.
    pub fn difference(&self) -> Option<Difference> {
        self.difference
    }

    /// Traversal depth; the root pair is at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// The first divergence found by a comparison.
///
/// Retains the chain of comparison nodes from the root pair to the failing
/// node so the failure can be rendered on demand.
#[derive(Debug, Clone)]
pub struct Mismatch {
    nodes: Vec<ComparisonNode>,
    failing: NodeId,
}

impl Mismatch {
    pub(crate) fn new(nodes: Vec<ComparisonNode>, failing: NodeId) -> Self {
        Self { nodes, failing }
    }

    pub(crate) fn into_parts(self) -> (Vec<ComparisonNode>, NodeId) {
        (self.nodes, self.failing)
    }

    /// The node at which the comparison stopped.
    pub fn failing_node(&self) -> &ComparisonNode {
        &self.nodes[self.failing]
    }

    /// Parent of `node`, if any.
    pub fn parent_of(&self, node: &ComparisonNode) -> Option<&ComparisonNode> {
        node.parent.and_then(|id| self.nodes.get(id))
    }

    /// The reported difference.
    ///
    /// A container-level difference on the failing node's parent (size,
    /// missing element, type) is preferred over the leaf's own.
    pub fn difference(&self) -> Difference {
        let leaf = self.failing_node();
        self.parent_of(leaf)
            .and_then(ComparisonNode::difference)
            .or(leaf.difference)
            .unwrap_or(Difference::ValueMismatch)
    }

    /// The node carrying [`Mismatch::difference`].
    pub fn reporting_node(&self) -> &ComparisonNode {
        let leaf = self.failing_node();
        match self.parent_of(leaf) {
            Some(parent) if parent.difference.is_some() => parent,
            Some(_) | None => leaf,
        }
    }

    /// Nodes from the root pair to the failing node, inclusive.
    pub fn path(&self) -> Vec<&ComparisonNode> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(self.failing);
        while let Some(node) = current {
            path.push(node);
            current = node.parent.and_then(|id| self.nodes.get(id));
        }
        path.reverse();
        path
    }

    /// Root-to-failure breadcrumb line.
    pub fn breadcrumb(&self, config: &DeepEqualsConfig) -> String {
        format::breadcrumb(self, config)
    }

    /// Expected/found block for the reported difference.
    pub fn details(&self, config: &DeepEqualsConfig) -> String {
        format::details(self, config)
    }

    /// Full diagnostic: breadcrumb followed by the expected/found block.
    pub fn render(&self, config: &DeepEqualsConfig) -> String {
        format::render(self, config)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&DeepEqualsConfig::default()))
    }
}
